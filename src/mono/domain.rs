// Fri Jan 23 2026 - Alex

use super::{OffsetsProfile, WalkError};
use crate::memory::{Address, MemoryReader, MemoryReaderExt};
use ahash::AHashSet;
use log::{debug, info};

/// Follows the RIP-relative load inside `mono_get_root_domain` to the
/// runtime's global domain pointer and dereferences it.
pub fn root_domain<R: MemoryReader + ?Sized>(
    reader: &R,
    profile: &OffsetsProfile,
    function: Address,
) -> Result<Address, WalkError> {
    let displacement = reader.read_i32(function + profile.root_domain_displacement)?;
    let global = (function + profile.root_domain_instruction_length).offset(displacement as i64);
    debug!("Root domain global at {} (displacement {})", global, displacement);

    let domain = reader.read_ptr(global)?;
    if domain.is_null() {
        return Err(WalkError::NullDomain);
    }
    info!("Root domain at {}", domain);
    Ok(domain)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyMatch {
    pub assembly: Address,
    pub image: Address,
    /// List nodes looked at, the matching one included.
    pub visited: usize,
}

/// Walks the domain's assembly list for an assembly named exactly `name`.
///
/// A list that loops back on itself counts as exhausted.
pub fn find_assembly_image<R: MemoryReader + ?Sized>(
    reader: &R,
    profile: &OffsetsProfile,
    domain: Address,
    name: &str,
) -> Result<AssemblyMatch, WalkError> {
    let mut node = reader.read_ptr(domain + profile.domain_assemblies)?;
    let mut seen = AHashSet::new();
    let mut visited = 0;

    while !node.is_null() && seen.insert(node) {
        visited += 1;

        let assembly = reader.read_ptr(node + profile.assembly_list_data)?;
        if let Some(assembly) = assembly.non_null() {
            let name_ptr = reader.read_ptr(assembly + profile.assembly_name)?;
            if let Some(name_ptr) = name_ptr.non_null() {
                let assembly_name = reader.read_c_string(name_ptr, profile.max_name_length as usize)?;
                debug!("Assembly {} at {}", assembly_name, assembly);

                if assembly_name == name {
                    let image = reader.read_ptr(assembly + profile.assembly_image)?;
                    info!("Found {} image at {}", name, image);
                    return Ok(AssemblyMatch {
                        assembly,
                        image,
                        visited,
                    });
                }
            }
        }

        node = reader.read_ptr(node + profile.assembly_list_next)?;
    }

    Err(WalkError::AssemblyNotFound {
        name: name.to_string(),
        visited,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::MonoBuilder;

    fn domain_with(names: &[&str]) -> (MonoBuilder, Address, Vec<Address>) {
        let mut mono = MonoBuilder::new();
        let mut images = Vec::new();
        let mut assemblies = Vec::new();
        for name in names {
            let image = mono.image(&[]);
            images.push(image);
            assemblies.push(mono.assembly(name, image));
        }
        let domain = mono.domain(&assemblies);
        (mono, domain, images)
    }

    #[test]
    fn test_root_domain_from_accessor() {
        let mut mono = MonoBuilder::new();
        let domain = mono.domain(&[]);
        let function = mono.root_domain_accessor(domain);
        let memory = mono.memory();

        assert_eq!(root_domain(&memory, &OffsetsProfile::default(), function).unwrap(), domain);
    }

    #[test]
    fn test_assembly_found_after_k_plus_one_visits() {
        let names = ["mscorlib", "UnityEngine", "Assembly-CSharp", "System"];
        let (mono, domain, images) = domain_with(&names);
        let memory = mono.memory();

        let found = find_assembly_image(&memory, &OffsetsProfile::default(), domain, "Assembly-CSharp").unwrap();
        assert_eq!(found.image, images[2]);
        assert_eq!(found.visited, 3);
    }

    #[test]
    fn test_assembly_name_is_case_sensitive() {
        let (mono, domain, _) = domain_with(&["assembly-csharp"]);
        let memory = mono.memory();

        let err = find_assembly_image(&memory, &OffsetsProfile::default(), domain, "Assembly-CSharp").unwrap_err();
        assert!(matches!(err, WalkError::AssemblyNotFound { visited: 1, .. }));
    }

    #[test]
    fn test_looping_list_is_exhausted() {
        let (mut mono, domain, _) = domain_with(&["mscorlib", "UnityEngine"]);
        mono.loop_assembly_list(domain);
        let memory = mono.memory();

        let err = find_assembly_image(&memory, &OffsetsProfile::default(), domain, "Assembly-CSharp").unwrap_err();
        assert!(matches!(err, WalkError::AssemblyNotFound { visited: 2, .. }));
    }
}
