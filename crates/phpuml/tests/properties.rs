//! Property tests for batch rendering

use phpuml::render;
use proptest::prelude::*;

fn class_name() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9_]{0,8}"
}

fn member_name() -> impl Strategy<Value = String> {
    "[a-z_][a-zA-Z0-9_]{0,8}"
}

fn visibility() -> impl Strategy<Value = (&'static str, char)> {
    prop_oneof![
        Just(("public ", '+')),
        Just(("private ", '-')),
        Just(("protected ", '#')),
        Just(("var ", '+')),
    ]
}

fn class_source() -> impl Strategy<Value = (String, String)> {
    (
        class_name(),
        prop::collection::vec((visibility(), member_name()), 0..4),
        prop::option::of(class_name()),
    )
        .prop_map(|(name, props, parent)| {
            let mut source = format!("<?php\nclass {}", name);
            let mut line = format!("[{}", name);
            if let Some(parent) = &parent {
                source.push_str(&format!(" extends {}", parent));
            }
            source.push_str(" {\n");
            if !props.is_empty() {
                line.push('|');
            }
            for ((keyword, glyph), prop) in &props {
                source.push_str(&format!("    {}${};\n", keyword, prop));
                line.push_str(&format!("{}{};", glyph, prop));
            }
            source.push_str("}\n");
            line.push_str("]\n");
            if let Some(parent) = &parent {
                line.push_str(&format!("[{}] -:> [{}]\n", name, parent));
            }
            (source, line)
        })
}

proptest! {
    #[test]
    fn render_is_idempotent(sources in prop::collection::vec(class_source(), 1..5)) {
        let texts: Vec<&str> = sources.iter().map(|(src, _)| src.as_str()).collect();
        let first = render(&texts).unwrap();
        let second = render(&texts).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn single_class_renders_exactly((source, expected) in class_source()) {
        prop_assert_eq!(render(&[source]).unwrap(), expected);
    }

    #[test]
    fn garbage_never_aborts_a_batch(noise in "\\PC{0,40}") {
        let source = format!("<?php {}", noise);
        let result = render(&[source.as_str(), "<?php class Stable {}"]);
        prop_assert_eq!(result.unwrap(), "[Stable]\n");
    }
}
