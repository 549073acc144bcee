#![no_main]

use libfuzzer_sys::fuzz_target;
use markup::{GroupConfig, Parser, TreeBuilderConfig};
use std::sync::OnceLock;

fn parsers() -> &'static [Parser; 2] {
    static PARSERS: OnceLock<[Parser; 2]> = OnceLock::new();
    PARSERS.get_or_init(|| {
        let config = GroupConfig::bbcode().tag("i", "inline").single_tag("hr");
        let plain = Parser::new(config).expect("fuzz config is valid");
        let coalescing = plain.clone().with_tree_builder_config(TreeBuilderConfig {
            coalesce_verbatim: true,
        });
        [plain, coalescing]
    })
}

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    for parser in parsers() {
        let tree = parser.parse(input);
        assert!(tree.is_root());
        assert_eq!(tree.to_source(), input, "tree must reconstruct input");
    }
});
