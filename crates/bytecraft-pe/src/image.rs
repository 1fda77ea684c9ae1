//! Decoded PE32 image headers.

use std::{fmt, sync::Arc};

use bytecraft::{
    render::render,
    schema::Schema,
    value::{Structure, Value},
};
use tracing::{debug, warn};

use crate::{
    errors::{PeError, Result},
    headers::{IMAGE_DOS_HEADER, IMAGE_DOS_SIGNATURE, IMAGE_NT_HEADERS32, IMAGE_SECTION_HEADER},
    io::{Readable, Writable},
    machine::Machine,
};

/// The headers of a 32-bit x86 PE image, decoded from a complete file buffer.
///
/// Headers are located through their offset fields (`e_lfanew`, then the section
/// table directly after the NT headers) rather than by scanning the file.
#[derive(Debug, Clone)]
pub struct PeImage {
    raw: Vec<u8>,
    dos_header: Structure,
    nt_headers: Structure,
    file_header: Structure,
    optional_header: Structure,
    section_headers: Vec<Structure>,
}

impl PeImage {
    pub fn from_readable(source: impl Readable) -> Result<Self> {
        Self::parse(source.read_bytes()?)
    }

    /// Decodes the DOS header, NT headers and section table of `raw`.
    pub fn parse(raw: Vec<u8>) -> Result<Self> {
        let magic = raw.get(..2).map(|b| u16::from_le_bytes([b[0], b[1]]));
        if magic != Some(IMAGE_DOS_SIGNATURE) {
            return Err(PeError::Format("`e_magic` mismatch".to_string()));
        }

        let dos_header = read_struct_at(&raw, &IMAGE_DOS_HEADER.get()?, 0)?;
        let e_lfanew = signed_field(&dos_header, "e_lfanew")?;
        debug!(e_lfanew, len = raw.len(), "decoded DOS header");

        let nt_schema = IMAGE_NT_HEADERS32.get()?;
        let nt_headers = read_struct_at(&raw, &nt_schema, e_lfanew)?;

        let file_header = nested(&nt_headers, "file_header")?;
        let optional_header = nested(&nt_headers, "optional_header")?;
        let machine = Machine::from(unsigned_field(&file_header, "machine")? as u16);
        if machine != Machine::I386 {
            warn!(%machine, "rejecting image for unsupported machine");
            return Err(PeError::UnsupportedMachine(machine));
        }

        let number_of_sections = unsigned_field(&file_header, "number_of_sections")?;
        debug!(%machine, number_of_sections, "decoded NT headers");

        // Section headers follow the NT headers back to back.
        let section_schema = IMAGE_SECTION_HEADER.get()?;
        let table_start = e_lfanew + nt_schema.size() as i64;
        let mut section_headers = Vec::with_capacity(number_of_sections as usize);
        for i in 0..number_of_sections as i64 {
            let offset = table_start + i * section_schema.size() as i64;
            section_headers.push(read_struct_at(&raw, &section_schema, offset)?);
        }

        Ok(PeImage {
            raw,
            dos_header,
            nt_headers,
            file_header,
            optional_header,
            section_headers,
        })
    }

    /// The complete image bytes this model was decoded from.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn dos_header(&self) -> &Structure {
        &self.dos_header
    }

    pub fn nt_headers(&self) -> &Structure {
        &self.nt_headers
    }

    pub fn file_header(&self) -> &Structure {
        &self.file_header
    }

    pub fn optional_header(&self) -> &Structure {
        &self.optional_header
    }

    /// Section headers in file order.
    pub fn section_headers(&self) -> &[Structure] {
        &self.section_headers
    }

    pub fn machine(&self) -> Machine {
        let code = self
            .file_header
            .get("machine")
            .and_then(Value::as_u64)
            .unwrap_or_default();
        Machine::from(code as u16)
    }

    /// Section names with trailing NULs removed.
    pub fn section_names(&self) -> Vec<String> {
        self.section_headers
            .iter()
            .filter_map(|section| section.get("name").and_then(Value::as_bytes))
            .map(|name| {
                let end = name.iter().position(|b| *b == 0).unwrap_or(name.len());
                String::from_utf8_lossy(&name[..end]).into_owned()
            })
            .collect()
    }

    /// Writes the raw image bytes to `sink`.
    pub fn save(&self, sink: impl Writable) -> Result<()> {
        sink.write_bytes(&self.raw)?;
        Ok(())
    }

    /// Multi-section text report of every decoded header.
    pub fn render(&self) -> String {
        let sections: Vec<String> = self
            .section_headers
            .iter()
            .map(Structure::summary)
            .collect();

        format!(
            "IMAGE_DOS_HEADER\n{}\n\nIMAGE_NT_HEADERS\n{}\n\nIMAGE_SECTION_HEADERS[{}]\n    {}",
            render(&self.dos_header, "    "),
            render(&self.nt_headers, "    "),
            self.section_headers.len(),
            sections.join("\n    "),
        )
    }
}

impl fmt::Display for PeImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Decodes `schema` from `raw[offset..offset + schema.size()]`.
fn read_struct_at(raw: &[u8], schema: &Arc<Schema>, offset: i64) -> Result<Structure> {
    let bounds = || PeError::Bounds {
        structure: schema.name().to_string(),
        offset,
        len: schema.size(),
        available: raw.len(),
    };

    let start = usize::try_from(offset).map_err(|_| bounds())?;
    let end = start.checked_add(schema.size()).ok_or_else(bounds)?;
    let data = raw.get(start..end).ok_or_else(bounds)?;

    Ok(Schema::decode(schema, data)?)
}

fn missing(structure: &Structure, name: &str) -> PeError {
    PeError::Format(format!("`{}` has no field `{name}`", structure.schema().name()))
}

fn nested(structure: &Structure, name: &str) -> Result<Structure> {
    structure
        .get(name)
        .and_then(Value::as_struct)
        .cloned()
        .ok_or_else(|| missing(structure, name))
}

fn unsigned_field(structure: &Structure, name: &str) -> Result<u64> {
    structure
        .get(name)
        .and_then(Value::as_u64)
        .ok_or_else(|| missing(structure, name))
}

fn signed_field(structure: &Structure, name: &str) -> Result<i64> {
    structure
        .get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| missing(structure, name))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use proptest::prelude::*;

    use crate::machine::{IMAGE_FILE_MACHINE_AMD64, IMAGE_FILE_MACHINE_I386};

    use super::*;

    const E_LFANEW: usize = 0x80;
    const NT_SIZE: usize = 248;
    const SECTION_SIZE: usize = 40;

    /// Builds a minimal PE32 image with the given machine and section names.
    fn build_image(machine: u16, sections: &[&[u8; 8]]) -> Vec<u8> {
        let mut data = vec![0u8; E_LFANEW + NT_SIZE + sections.len() * SECTION_SIZE];
        data[0..2].copy_from_slice(b"MZ");
        data[60..64].copy_from_slice(&(E_LFANEW as i32).to_le_bytes());

        let nt = E_LFANEW;
        data[nt..nt + 4].copy_from_slice(b"PE\0\0");
        data[nt + 4..nt + 6].copy_from_slice(&machine.to_le_bytes());
        data[nt + 6..nt + 8].copy_from_slice(&(sections.len() as u16).to_le_bytes());
        data[nt + 20..nt + 22].copy_from_slice(&224u16.to_le_bytes());

        let optional = nt + 24;
        data[optional..optional + 2].copy_from_slice(&0x010Bu16.to_le_bytes());
        data[optional + 16..optional + 20].copy_from_slice(&0x1000u32.to_le_bytes());
        data[optional + 28..optional + 32].copy_from_slice(&0x0040_0000u32.to_le_bytes());
        data[optional + 92..optional + 96].copy_from_slice(&16u32.to_le_bytes());

        for (i, name) in sections.iter().enumerate() {
            let section = E_LFANEW + NT_SIZE + i * SECTION_SIZE;
            data[section..section + 8].copy_from_slice(*name);
            let virtual_address = 0x1000 * (i as u32 + 1);
            data[section + 12..section + 16].copy_from_slice(&virtual_address.to_le_bytes());
        }

        data
    }

    #[test]
    fn test_parse_sections_in_order() {
        let image = PeImage::parse(build_image(
            IMAGE_FILE_MACHINE_I386,
            &[b".text\0\0\0", b".rdata\0\0", b".data\0\0\0"],
        ))
        .unwrap();

        assert_eq!(image.machine(), Machine::I386);
        assert_eq!(image.section_headers().len(), 3);
        assert_eq!(image.section_names(), vec![".text", ".rdata", ".data"]);

        let addresses: Vec<u64> = image
            .section_headers()
            .iter()
            .filter_map(|section| section.get("virtual_address").and_then(Value::as_u64))
            .collect();
        assert_eq!(addresses, vec![0x1000, 0x2000, 0x3000]);
    }

    #[test]
    fn test_parse_headers() {
        let image = PeImage::parse(build_image(IMAGE_FILE_MACHINE_I386, &[])).unwrap();

        assert_eq!(
            image.dos_header().get("e_lfanew"),
            Some(&Value::I64(E_LFANEW as i64))
        );
        assert_eq!(
            image.nt_headers().get("signature").and_then(Value::as_u64),
            Some(0x4550)
        );
        assert_eq!(
            image.optional_header().get("address_of_entry_point"),
            Some(&Value::U64(0x1000))
        );
        assert_eq!(
            image.optional_header().get("image_base"),
            Some(&Value::U64(0x0040_0000))
        );

        let directories = image
            .optional_header()
            .get("data_directory")
            .and_then(Value::as_array)
            .unwrap();
        assert_eq!(directories.len(), 16);
        assert!(image.section_headers().is_empty());
    }

    #[test]
    fn test_wrong_magic() {
        let mut data = build_image(IMAGE_FILE_MACHINE_I386, &[b".text\0\0\0"]);
        data[0..2].copy_from_slice(b"ZM");
        assert!(matches!(PeImage::parse(data), Err(PeError::Format(_))));

        assert!(matches!(PeImage::parse(Vec::new()), Err(PeError::Format(_))));
        assert!(matches!(PeImage::parse(vec![0x4D]), Err(PeError::Format(_))));
    }

    #[test]
    fn test_unsupported_machine() {
        let data = build_image(IMAGE_FILE_MACHINE_AMD64, &[b".text\0\0\0"]);
        assert!(matches!(
            PeImage::parse(data),
            Err(PeError::UnsupportedMachine(Machine::Amd64))
        ));

        let data = build_image(0x0200, &[]);
        assert!(matches!(
            PeImage::parse(data),
            Err(PeError::UnsupportedMachine(Machine::Ia64))
        ));
    }

    #[test]
    fn test_truncated_dos_header() {
        assert!(matches!(
            PeImage::parse(b"MZ".to_vec()),
            Err(PeError::Bounds { offset: 0, len: 64, available: 2, .. })
        ));
    }

    #[test]
    fn test_nt_headers_out_of_bounds() {
        let mut data = build_image(IMAGE_FILE_MACHINE_I386, &[]);
        data[60..64].copy_from_slice(&0x1000i32.to_le_bytes());
        assert!(matches!(
            PeImage::parse(data),
            Err(PeError::Bounds { offset: 0x1000, len: 248, .. })
        ));
    }

    #[test]
    fn test_negative_e_lfanew() {
        let mut data = build_image(IMAGE_FILE_MACHINE_I386, &[]);
        data[60..64].copy_from_slice(&(-8i32).to_le_bytes());
        assert!(matches!(
            PeImage::parse(data),
            Err(PeError::Bounds { offset: -8, .. })
        ));
    }

    #[test]
    fn test_truncated_section_table() {
        let mut data = build_image(IMAGE_FILE_MACHINE_I386, &[b".text\0\0\0", b".data\0\0\0"]);
        data.truncate(data.len() - 1);

        match PeImage::parse(data) {
            Err(PeError::Bounds { structure, offset, len, .. }) => {
                assert_eq!(structure, "IMAGE_SECTION_HEADER");
                assert_eq!(offset, (E_LFANEW + NT_SIZE + SECTION_SIZE) as i64);
                assert_eq!(len, SECTION_SIZE);
            }
            other => panic!("expected a bounds error, got {other:?}"),
        }
    }

    #[test]
    fn test_render_report() {
        let image = PeImage::parse(build_image(IMAGE_FILE_MACHINE_I386, &[b".text\0\0\0"])).unwrap();
        let report = image.to_string();

        assert!(report.starts_with("IMAGE_DOS_HEADER\n    e_magic     5a4dh (23117)\n"));
        assert!(report.contains("    e_lfanew    00000080h (128)\n"));
        assert!(report.contains("\n\nIMAGE_NT_HEADERS\n    signature        00004550h (17,744)\n"));
        assert!(report.contains("    file_header      IMAGE_FILE_HEADER\n"));
        assert!(report.contains("IMAGE_DATA_DIRECTORY[16]"));

        // data_directory rows sit under the optional header's 30-wide name column.
        let row = " ".repeat(25 + 30 + 2);
        assert!(report.contains(&format!("\n{row}[9]  virtual_address  00000000h (0)\n")));
        assert!(report.contains(&format!("\n{row}[10] virtual_address  00000000h (0)\n")));
        assert!(report.contains(&format!("\n{row}[15] virtual_address  00000000h (0)\n")));
        assert!(report.ends_with(
            "IMAGE_SECTION_HEADERS[1]\n    <IMAGE_SECTION_HEADER name=`'.text'`, \
             physical_address_or_virtual_size=`00000000h (0)`, \
             virtual_address=`00001000h (4,096)` ...>"
        ));
    }

    #[test]
    fn test_readable_and_save() {
        let data = build_image(IMAGE_FILE_MACHINE_I386, &[b".text\0\0\0"]);
        let mut cursor = Cursor::new(data.clone());
        let image = PeImage::from_readable(&mut cursor).unwrap();

        let mut out = Vec::new();
        image.save(&mut out).unwrap();
        assert_eq!(out, data);
        assert_eq!(image.raw(), &data[..]);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            PeImage::from_readable(std::path::Path::new("/nonexistent/bytecraft/image.exe")),
            Err(PeError::Io(_))
        ));
    }

    proptest! {
        #[test]
        fn wrong_magic_is_format_error(
            first in any::<u16>().prop_filter("not MZ", |m| *m != IMAGE_DOS_SIGNATURE),
            rest in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let mut data = first.to_le_bytes().to_vec();
            data.extend(rest);
            prop_assert!(matches!(PeImage::parse(data), Err(PeError::Format(_))));
        }

        #[test]
        fn section_count_matches_header(count in 0usize..12) {
            let names: Vec<[u8; 8]> = (0..count)
                .map(|i| {
                    let mut name = *b".sec\0\0\0\0";
                    name[4] = b'0' + i as u8 % 10;
                    name
                })
                .collect();
            let refs: Vec<&[u8; 8]> = names.iter().collect();

            let image = PeImage::parse(build_image(IMAGE_FILE_MACHINE_I386, &refs)).unwrap();
            prop_assert_eq!(image.section_headers().len(), count);
        }
    }
}
