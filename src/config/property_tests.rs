//! Property-based tests for configuration module
//!
//! These tests use proptest to generate configurations and check that
//! validation accepts exactly the well-formed ones and that saved files
//! load back unchanged.

use super::*;
use proptest::prelude::*;

fn keysym() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Escape".to_string()),
        Just("F1".to_string()),
        Just("F2".to_string()),
        Just("Tab".to_string()),
        "[a-z]",
        "F[1-9][0-2]?",
    ]
}

fn modifier() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Alt".to_string()),
        Just("Super".to_string()),
        Just("Ctrl".to_string()),
        Just("Super+Shift".to_string()),
        Just("Ctrl+Alt".to_string()),
    ]
}

prop_compose! {
    fn valid_bindings_config()(
        modifier in modifier(),
        terminate in keysym(),
        cycle_focus in keysym(),
    ) -> BindingsConfig {
        let cycle_focus = if cycle_focus == terminate {
            format!("{}_alt", cycle_focus)
        } else {
            cycle_focus
        };
        BindingsConfig { modifier, terminate, cycle_focus }
    }
}

prop_compose! {
    fn valid_config()(
        keyboard_repeat_rate in 1u32..100,
        keyboard_repeat_delay in 0u32..2000,
        bindings in valid_bindings_config(),
        theme_size in 1u32..256,
        refocus_on_unmap in any::<bool>(),
        debug in any::<bool>(),
    ) -> CompositorConfig {
        CompositorConfig {
            input: InputConfig {
                keyboard_repeat_rate,
                keyboard_repeat_delay,
                xkb_layout: "us".to_string(),
            },
            bindings,
            cursor: CursorConfig {
                theme_size,
                default_image: "default".to_string(),
            },
            focus: FocusConfig { refocus_on_unmap },
            general: GeneralConfig { debug },
        }
    }
}

proptest! {
    #[test]
    fn test_generated_configs_validate(config in valid_config()) {
        prop_assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_toml_roundtrip(config in valid_config()) {
        let toml_string = toml::to_string_pretty(&config).unwrap();
        let parsed: CompositorConfig = toml::from_str(&toml_string).unwrap();
        prop_assert_eq!(parsed, config);
    }

    #[test]
    fn test_zero_repeat_rate_rejected(mut config in valid_config()) {
        config.input.keyboard_repeat_rate = 0;
        prop_assert!(config.validate().is_err());
    }

    #[test]
    fn test_identical_bindings_rejected(mut config in valid_config()) {
        config.bindings.cycle_focus = config.bindings.terminate.clone();
        prop_assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_modifier_rejected(name in "[A-Z][a-z]{5,8}") {
        prop_assume!(Modifiers::from_names(&name).is_none());
        let mut config = CompositorConfig::default();
        config.bindings.modifier = name;
        prop_assert!(config.validate().is_err());
    }
}
