// Thu Jan 22 2026 - Alex

use super::{ModuleImage, PeError};
use crate::memory::Address;
use crate::mono::OffsetsProfile;
use log::{debug, info};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy)]
struct ExportDirectory {
    number_of_functions: u32,
    number_of_names: u32,
    address_of_functions: u32,
    address_of_names: u32,
    address_of_name_ordinals: u32,
}

impl ExportDirectory {
    fn read(image: &ModuleImage, profile: &OffsetsProfile) -> Result<Self, PeError> {
        let e_lfanew = image.u32_at(profile.pe_e_lfanew as u64)?;
        let directory = image.u32_at(e_lfanew as u64 + profile.pe_export_directory as u64)?;
        if directory == 0 {
            return Err(PeError::Malformed("module has no export directory".to_string()));
        }
        debug!("e_lfanew: 0x{:04x}, export directory: 0x{:04x}", e_lfanew, directory);

        let at = |field: u32| image.u32_at(directory as u64 + field as u64);
        let exports = Self {
            number_of_functions: at(profile.export_number_of_functions)?,
            number_of_names: at(profile.export_number_of_names)?,
            address_of_functions: at(profile.export_address_of_functions)?,
            address_of_names: at(profile.export_address_of_names)?,
            address_of_name_ordinals: at(profile.export_address_of_name_ordinals)?,
        };

        // Both name-side arrays must fit before the parallel scan starts.
        image.slice(exports.address_of_names as u64, exports.number_of_names as usize * 4)?;
        image.slice(
            exports.address_of_name_ordinals as u64,
            exports.number_of_names as usize * 2,
        )?;

        Ok(exports)
    }

    fn function_rva(&self, image: &ModuleImage, index: u32) -> Result<u32, PeError> {
        let ordinal = image.u16_at(self.address_of_name_ordinals as u64 + index as u64 * 2)?;
        if ordinal as u32 >= self.number_of_functions {
            return Err(PeError::Malformed(format!(
                "name ordinal {} exceeds function count {}",
                ordinal, self.number_of_functions
            )));
        }
        image.u32_at(self.address_of_functions as u64 + ordinal as u64 * 4)
    }
}

/// Resolves `symbol` in the export table of `image` and returns its address
/// in the target.
///
/// Names are compared in parallel; the first worker to match ends the scan.
pub fn find_export(image: &ModuleImage, profile: &OffsetsProfile, symbol: &str) -> Result<Address, PeError> {
    let exports = ExportDirectory::read(image, profile)?;
    debug!(
        "{} functions, {} names in export table",
        exports.number_of_functions, exports.number_of_names
    );

    // An unreadable name only rules out its own entry.
    let wanted = symbol.as_bytes();
    let found = (0..exports.number_of_names)
        .into_par_iter()
        .find_map_any(|index| {
            let name = image
                .u32_at(exports.address_of_names as u64 + index as u64 * 4)
                .and_then(|rva| image.c_str_at(rva as u64));
            match name {
                Ok(name) if name == wanted => Some(exports.function_rva(image, index)),
                Ok(_) => None,
                Err(e) => {
                    debug!("Skipping export name {}: {}", index, e);
                    None
                }
            }
        });

    match found {
        Some(Ok(rva)) => {
            let address = image.base() + rva as u64;
            info!("Found {} at {}", symbol, address);
            Ok(address)
        }
        Some(Err(e)) => Err(e),
        None => Err(PeError::ExportNotFound(symbol.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::PeBuilder;

    fn image(bytes: Vec<u8>) -> ModuleImage {
        ModuleImage::from_bytes(Address::new(0x7ff0_0000_0000), bytes)
    }

    #[test]
    fn test_finds_export() {
        let bytes = PeBuilder::new()
            .export("mono_thread_attach", 0x1100)
            .export("mono_get_root_domain", 0x1200)
            .export("mono_class_get_name", 0x1300)
            .build();

        let address = find_export(&image(bytes), &OffsetsProfile::default(), "mono_get_root_domain").unwrap();
        assert_eq!(address, Address::new(0x7ff0_0000_1200));
    }

    #[test]
    fn test_missing_export() {
        let bytes = PeBuilder::new().export("mono_thread_attach", 0x1100).build();

        let err = find_export(&image(bytes), &OffsetsProfile::default(), "mono_get_root_domain").unwrap_err();
        assert_eq!(err, PeError::ExportNotFound("mono_get_root_domain".to_string()));
    }

    #[test]
    fn test_prefix_is_not_a_match() {
        let bytes = PeBuilder::new().export("mono_get_root_domain_ex", 0x1100).build();
        assert!(find_export(&image(bytes), &OffsetsProfile::default(), "mono_get_root_domain").is_err());
    }

    #[test]
    fn test_corrupt_neighbour_name_is_skipped() {
        let mut builder = PeBuilder::new();
        for i in 0..40 {
            builder = builder.export(&format!("mono_filler_{}", i), 0x1000 + i);
        }
        let bytes = builder
            .export("mono_get_root_domain", 0x1200)
            .name_rva(0, 0x7fff_ffff)
            .build();

        let address = find_export(&image(bytes), &OffsetsProfile::default(), "mono_get_root_domain").unwrap();
        assert_eq!(address, Address::new(0x7ff0_0000_1200));
    }

    #[test]
    fn test_unreadable_names_only_give_not_found() {
        let bytes = PeBuilder::new()
            .export("mono_get_root_domain", 0x1200)
            .name_rva(0, 0x7fff_ffff)
            .build();

        let err = find_export(&image(bytes), &OffsetsProfile::default(), "mono_get_root_domain").unwrap_err();
        assert_eq!(err, PeError::ExportNotFound("mono_get_root_domain".to_string()));
    }

    #[test]
    fn test_truncated_image_is_malformed() {
        let mut bytes = PeBuilder::new().export("mono_get_root_domain", 0x1200).build();
        bytes.truncate(0x210);

        let err = find_export(&image(bytes), &OffsetsProfile::default(), "mono_get_root_domain").unwrap_err();
        assert!(matches!(err, PeError::OutOfBounds { .. }));
    }
}
