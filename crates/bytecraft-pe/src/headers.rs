//! PE32 header layouts, field names following the Windows SDK in snake_case.

use bytecraft::{
    errors::SchemaDefinitionError,
    field::Field,
    kind::ScalarKind::{Byte, Dword, Long, Word},
    schema::{Schema, SchemaCell},
};

/// `MZ`
pub const IMAGE_DOS_SIGNATURE: u16 = 0x5A4D;
pub const IMAGE_NUMBEROF_DIRECTORY_ENTRIES: usize = 16;
pub const IMAGE_SIZEOF_SHORT_NAME: usize = 8;

pub static IMAGE_DOS_HEADER: SchemaCell = SchemaCell::new(dos_header);
pub static IMAGE_FILE_HEADER: SchemaCell = SchemaCell::new(file_header);
pub static IMAGE_DATA_DIRECTORY: SchemaCell = SchemaCell::new(data_directory);
pub static IMAGE_OPTIONAL_HEADER32: SchemaCell = SchemaCell::new(optional_header32);
pub static IMAGE_NT_HEADERS32: SchemaCell = SchemaCell::new(nt_headers32);
pub static IMAGE_SECTION_HEADER: SchemaCell = SchemaCell::new(section_header);

fn dos_header() -> Result<Schema, SchemaDefinitionError> {
    Schema::define(
        "IMAGE_DOS_HEADER",
        &[
            Field::scalar("e_magic", Word),
            Field::scalar("e_cblp", Word),
            Field::scalar("e_cp", Word),
            Field::scalar("e_crlc", Word),
            Field::scalar("e_cparhdr", Word),
            Field::scalar("e_minalloc", Word),
            Field::scalar("e_maxalloc", Word),
            Field::scalar("e_ss", Word),
            Field::scalar("e_sp", Word),
            Field::scalar("e_csum", Word),
            Field::scalar("e_ip", Word),
            Field::scalar("e_cs", Word),
            Field::scalar("e_lfarlc", Word),
            Field::scalar("e_ovno", Word),
            Field::scalar("e_res", Word).array(4),
            Field::scalar("e_oemid", Word),
            Field::scalar("e_oeminfo", Word),
            Field::scalar("e_res2", Word).array(10),
            // File offset of the NT headers.
            Field::scalar("e_lfanew", Long),
        ],
    )
}

fn file_header() -> Result<Schema, SchemaDefinitionError> {
    Schema::define(
        "IMAGE_FILE_HEADER",
        &[
            Field::scalar("machine", Word),
            Field::scalar("number_of_sections", Word),
            Field::scalar("time_date_stamp", Dword),
            Field::scalar("pointer_to_symbol_table", Dword),
            Field::scalar("number_of_symbols", Dword),
            Field::scalar("size_of_optional_header", Word),
            Field::scalar("characteristics", Word),
        ],
    )
}

fn data_directory() -> Result<Schema, SchemaDefinitionError> {
    Schema::define(
        "IMAGE_DATA_DIRECTORY",
        &[
            Field::scalar("virtual_address", Dword),
            Field::scalar("size", Dword),
        ],
    )
}

fn optional_header32() -> Result<Schema, SchemaDefinitionError> {
    let data_directory = IMAGE_DATA_DIRECTORY.get()?;

    Schema::define(
        "IMAGE_OPTIONAL_HEADER32",
        &[
            // Standard fields
            Field::scalar("magic", Word),
            Field::scalar("major_linker_version", Byte),
            Field::scalar("minor_linker_version", Byte),
            Field::scalar("size_of_code", Dword),
            Field::scalar("size_of_initialized_data", Dword),
            Field::scalar("size_of_uninitialized_data", Dword),
            Field::scalar("address_of_entry_point", Dword),
            Field::scalar("base_of_code", Dword),
            Field::scalar("base_of_data", Dword),
            // NT additional fields
            Field::scalar("image_base", Dword),
            Field::scalar("section_alignment", Dword),
            Field::scalar("file_alignment", Dword),
            Field::scalar("major_operating_system_version", Word),
            Field::scalar("minor_operating_system_version", Word),
            Field::scalar("major_image_version", Word),
            Field::scalar("minor_image_version", Word),
            Field::scalar("major_subsystem_version", Word),
            Field::scalar("minor_subsystem_version", Word),
            Field::scalar("win32_version_value", Dword),
            Field::scalar("size_of_image", Dword),
            Field::scalar("size_of_headers", Dword),
            Field::scalar("check_sum", Dword),
            Field::scalar("subsystem", Word),
            Field::scalar("dll_characteristics", Word),
            Field::scalar("size_of_stack_reserve", Dword),
            Field::scalar("size_of_stack_commit", Dword),
            Field::scalar("size_of_heap_reserve", Dword),
            Field::scalar("size_of_heap_commit", Dword),
            Field::scalar("loader_flags", Dword),
            Field::scalar("number_of_rva_and_sizes", Dword),
            Field::structure("data_directory", &data_directory)
                .array(IMAGE_NUMBEROF_DIRECTORY_ENTRIES),
        ],
    )
}

fn nt_headers32() -> Result<Schema, SchemaDefinitionError> {
    let file_header = IMAGE_FILE_HEADER.get()?;
    let optional_header = IMAGE_OPTIONAL_HEADER32.get()?;

    Schema::define(
        "IMAGE_NT_HEADERS32",
        &[
            Field::scalar("signature", Dword),
            Field::structure("file_header", &file_header),
            Field::structure("optional_header", &optional_header),
        ],
    )
}

fn section_header() -> Result<Schema, SchemaDefinitionError> {
    Schema::define(
        "IMAGE_SECTION_HEADER",
        &[
            Field::bytes("name", IMAGE_SIZEOF_SHORT_NAME),
            // Physical address and virtual size share this slot.
            Field::scalar("physical_address_or_virtual_size", Dword),
            Field::scalar("virtual_address", Dword),
            Field::scalar("size_of_raw_data", Dword),
            Field::scalar("pointer_to_raw_data", Dword),
            Field::scalar("pointer_to_relocations", Dword),
            Field::scalar("pointer_to_linenumbers", Dword),
            Field::scalar("number_of_relocations", Word),
            Field::scalar("number_of_linenumbers", Word),
            Field::scalar("characteristics", Dword),
        ],
    )
}
