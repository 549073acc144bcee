#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let tokens = markup::tokenize(input);
    assert_eq!(tokens.to_source(), input, "token raw text must reproduce input");
    for token in &tokens {
        assert!(!token.raw().is_empty(), "tokens are never empty");
        assert_eq!(&input[token.span().range()], token.raw());
    }
});
