//! Built-in schema definitions, embedded at compile time.

use std::sync::{Arc, OnceLock};

use crate::registry::SchemaRegistry;

/// Embedded definition files as `(origin, text)`, in load order.
pub const BUILTIN_DEFINITIONS: [(&str, &str); 3] = [
    ("builtin:memory.toml", include_str!("../schema/memory.toml")),
    ("builtin:system.toml", include_str!("../schema/system.toml")),
    ("builtin:effects.toml", include_str!("../schema/effects.toml")),
];

static BUILTIN: OnceLock<Arc<SchemaRegistry>> = OnceLock::new();

impl SchemaRegistry {
    /// The process-wide built-in registry, built on first use.
    ///
    /// # Panics
    ///
    /// Panics if the embedded definitions are invalid, which the crate's
    /// tests rule out.
    pub fn builtin() -> Arc<SchemaRegistry> {
        BUILTIN
            .get_or_init(|| {
                let mut registry = SchemaRegistry::new();
                for (origin, text) in BUILTIN_DEFINITIONS {
                    registry
                        .load_str(origin, text)
                        .expect("embedded schema definitions are valid");
                }
                tracing::info!(
                    sections = registry.len(),
                    effects = registry.effects().count(),
                    "loaded built-in schema"
                );
                Arc::new(registry)
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, Value};
    use crate::registry::Resolution;
    use crate::section::SectionPath;

    #[test]
    fn test_builtin_loads() {
        for (origin, text) in BUILTIN_DEFINITIONS {
            SchemaRegistry::from_toml(origin, text).unwrap();
        }
        let r = SchemaRegistry::builtin();
        assert!(!r.is_empty());
        assert!(Arc::ptr_eq(&r, &SchemaRegistry::builtin()));
    }

    #[test]
    fn test_builtin_track_layout() {
        let r = SchemaRegistry::builtin();
        let res = r.section_schema(&SectionPath::new(["database", "mem"], "TRACK1"));
        let layout = res.layout().unwrap();
        assert_eq!(layout.width(), 25);
        let pan = &layout.fields()[layout.index_of("pan").unwrap()];
        assert_eq!(pan.bounds(), Some((0, 100)));
        assert_eq!(pan.default, Value::Int(50));
        let total = &layout.fields()[layout.index_of("total_samples").unwrap()];
        assert!(total.read_only);
        assert_eq!(layout.start_of(layout.index_of("total_samples").unwrap()), Some(23));
    }

    #[test]
    fn test_builtin_name_is_char_run() {
        let r = SchemaRegistry::builtin();
        let res = r.section_schema(&SectionPath::new(["database", "mem"], "NAME"));
        let layout = res.layout().unwrap();
        assert_eq!(layout.fields()[0].kind, FieldKind::Chars { len: 12 });
    }

    #[test]
    fn test_builtin_setup_per_group() {
        let r = SchemaRegistry::builtin();
        let sys = r.section_schema(&SectionPath::new(["database", "sys"], "SETUP"));
        let ifx = r.section_schema(&SectionPath::new(["database", "ifx"], "SETUP"));
        assert_eq!(sys.layout().unwrap().width(), 22);
        assert_eq!(ifx.layout().unwrap().index_of("current_slot"), Some(0));
        assert_ne!(sys, ifx);
    }

    #[test]
    fn test_builtin_effect_tables() {
        let r = SchemaRegistry::builtin();
        assert_eq!(r.effect_name("ifx", 0), Some("LPF"));
        assert_eq!(r.effect_name("ifx", 35), Some("DELAY"));
        assert_eq!(r.effect_name("ifx", 48), Some("REVERB"));
        assert_eq!(r.effect_name("ifx", 66), None);
        assert_eq!(r.effect_name("tfx", 66), Some("BEAT_SCATTER"));
        assert_eq!(r.effect_name("tfx", 69), Some("VINYL_FLICK"));
        assert_eq!(r.effect_index("tfx", "beat_scatter"), Some(66));
        assert_eq!(r.effect_name("ifx", 55), None);
    }

    #[test]
    fn test_builtin_effect_blocks() {
        let r = SchemaRegistry::builtin();
        let blocks = [("AA_DELAY", 6), ("AB_LPF", 5), ("CD_LPF_SEQ", 22), ("AA_REVERB", 7)];
        for (name, width) in blocks {
            let res = r.section_schema(&SectionPath::new(["database", "ifx"], name));
            assert!(matches!(res, Resolution::Effect { .. }), "{name}");
            assert_eq!(res.layout().unwrap().width(), width, "{name}");
        }
    }

    #[test]
    fn test_builtin_ctl_families() {
        let r = SchemaRegistry::builtin();
        for group in ["sys", "mem"] {
            let res = r.section_schema(&SectionPath::new(["database", group], "ICTL1_TRACK1_FX"));
            assert_eq!(res.schema_name(), Some("ICTL"));
            let res = r.section_schema(&SectionPath::new(["database", group], "ECTL_EXP1"));
            assert_eq!(res.layout().unwrap().index_of("ctl_range"), Some(3));
        }
    }
}
