//! On-disk LUT format: a 16-byte header followed by raw RGBA32F texels.

use std::io::{self, Write};
use std::path::Path;

use aether_multiscatter::MultiscatteringLut;
use bytemuck::{Pod, Zeroable};

/// File magic for a multiscattering table.
pub const MAGIC: [u8; 4] = *b"AEMS";
/// Current format version.
pub const VERSION: u32 = 1;

/// Little-endian file header.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct LutHeader {
    pub magic: [u8; 4],
    pub version: u32,
    pub width: u32,
    pub height: u32,
}

impl LutHeader {
    pub fn for_lut(lut: &MultiscatteringLut) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION.to_le(),
            width: lut.size.x.to_le(),
            height: lut.size.y.to_le(),
        }
    }
}

/// Write the header and texels to `writer`.
pub fn write_lut<W: Write>(writer: &mut W, lut: &MultiscatteringLut) -> io::Result<()> {
    writer.write_all(bytemuck::bytes_of(&LutHeader::for_lut(lut)))?;
    writer.write_all(lut.as_bytes())?;
    writer.flush()
}

/// Write the LUT to `path`, creating parent directories.
pub fn write_lut_file(path: &Path, lut: &MultiscatteringLut) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = io::BufWriter::new(std::fs::File::create(path)?);
    write_lut(&mut writer, lut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;

    fn lut() -> MultiscatteringLut {
        let data = (0..6).map(|i| [i as f32, 0.5, 0.25, 1.0]).collect();
        MultiscatteringLut::new(UVec2::new(3, 2), data).unwrap()
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(std::mem::size_of::<LutHeader>(), 16);
        let mut bytes = Vec::new();
        write_lut(&mut bytes, &lut()).unwrap();
        assert_eq!(&bytes[0..4], b"AEMS");
        assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &3u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &2u32.to_le_bytes());
        assert_eq!(bytes.len(), 16 + 6 * 16);
    }

    #[test]
    fn test_texels_follow_header() {
        let mut bytes = Vec::new();
        write_lut(&mut bytes, &lut()).unwrap();
        let texels: Vec<[f32; 4]> = bytes[16..]
            .chunks_exact(16)
            .map(|chunk| bytemuck::pod_read_unaligned(chunk))
            .collect();
        assert_eq!(texels, lut().data);
    }

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/sky.lut");
        write_lut_file(&path, &lut()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let header: LutHeader = bytemuck::pod_read_unaligned(&bytes[..16]);
        assert_eq!(header, LutHeader::for_lut(&lut()));
    }
}
