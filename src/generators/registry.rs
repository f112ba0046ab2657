//! Static generator registry
//!
//! Lookup is by kind tag. Unknown tags resolve to the default kind.

use super::{
    Blotch, Cellular, Crackle, DirectionalFbm, EdgeWear, LineBands, MicroGrain, NoiseGenerator,
    RidgedFbm, StreakFlow, TileGrid, ValueFbm,
};

/// Kind used for fresh layers and unresolvable tags
pub const DEFAULT_GENERATOR_ID: &str = "value_fbm";

static GENERATORS: [&dyn NoiseGenerator; 11] = [
    &ValueFbm,
    &RidgedFbm,
    &DirectionalFbm,
    &LineBands,
    &TileGrid,
    &Cellular,
    &EdgeWear,
    &MicroGrain,
    &StreakFlow,
    &Crackle,
    &Blotch,
];

/// All registered generators in catalog order
pub fn list_generators() -> impl Iterator<Item = &'static dyn NoiseGenerator> {
    GENERATORS.iter().copied()
}

/// Find a generator by its kind tag
pub fn get_generator(id: &str) -> Option<&'static dyn NoiseGenerator> {
    list_generators().find(|g| g.id() == id)
}

/// Find a generator, falling back to the default kind
pub fn resolve_generator(id: &str) -> &'static dyn NoiseGenerator {
    get_generator(id).unwrap_or(GENERATORS[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_ids_are_unique() {
        let ids: HashSet<&str> = list_generators().map(|g| g.id()).collect();
        assert_eq!(ids.len(), 11);
    }

    #[test]
    fn test_default_is_first() {
        assert_eq!(GENERATORS[0].id(), DEFAULT_GENERATOR_ID);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(get_generator("crackle").map(|g| g.id()), Some("crackle"));
        assert!(get_generator("perlin").is_none());
        assert_eq!(resolve_generator("perlin").id(), DEFAULT_GENERATOR_ID);
    }
}
