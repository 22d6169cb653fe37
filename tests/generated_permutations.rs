mod common;
use common::assert_pair;

// Macro to generate tests for single chars as keys
macro_rules! tests_for_chars {
    ($($char:ident),*) => {
        paste::paste! {
            $(
                #[test]
                #[allow(non_snake_case)]
                fn [<test_key_char_ $char>]() {
                    let c = stringify!($char);
                    let input = format!("{}=v", c);
                    assert_pair(&input, c, "v");
                }
            )*
        }
    }
}

tests_for_chars!(
    A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p, q, r, s, t, u, v, w, x, y, z
);

// 0-9 for value content
macro_rules! tests_for_val_digits {
    ($($d:literal),*) => {
        paste::paste! {
            $(
                #[test]
                fn [<test_val_digit_ $d>]() {
                    let s = stringify!($d);
                    let input = format!("K={}", s);
                    assert_pair(&input, "K", s);
                }
            )*
        }
    }
}

tests_for_val_digits!(0, 1, 2, 3, 4, 5, 6, 7, 8, 9);

// Special chars survive both quoting styles
macro_rules! tests_for_specials {
    ($name:ident, $sym:expr) => {
        paste::paste! {
            #[test]
            fn [<test_special_single_ $name>]() {
                 let input = format!("K='{}'", $sym);
                 assert_pair(&input, "K", $sym);
            }
            #[test]
            fn [<test_special_double_ $name>]() {
                 let input = format!("K=\"{}\"", $sym);
                 assert_pair(&input, "K", $sym);
            }
        }
    }
}

tests_for_specials!(at, "@");
tests_for_specials!(hash, "#");
tests_for_specials!(bang, "!");
tests_for_specials!(caret, "^");
tests_for_specials!(amp, "&");
tests_for_specials!(star, "*");
tests_for_specials!(paren, "()");
tests_for_specials!(plus, "+");
tests_for_specials!(tilde, "~");
tests_for_specials!(pipe, "|");
tests_for_specials!(semicolon, ";");
tests_for_specials!(colon, ":");
tests_for_specials!(comma, ",");
tests_for_specials!(lt_gt, "<>");
tests_for_specials!(question, "?");
tests_for_specials!(brace, "{}");
tests_for_specials!(equals, "=");
tests_for_specials!(lone_dollar, "$");
tests_for_specials!(lone_percent, "%");
tests_for_specials!(dollar_space, "$ 5");

// Escapes in double quotes collapse to the escaped character
macro_rules! tests_for_double_escapes {
    ($($name:ident => ($raw:expr, $expected:expr)),* $(,)?) => {
        paste::paste! {
            $(
                #[test]
                fn [<test_double_escape_ $name>]() {
                    let input = format!("K=\"{}\"", $raw);
                    assert_pair(&input, "K", $expected);
                }
            )*
        }
    }
}

tests_for_double_escapes!(
    dollar => ("\\$", "$"),
    percent => ("\\%", "%"),
    backslash => ("\\\\", "\\"),
    quote => ("\\\"", "\""),
    braced => ("\\${X}", "${X}"),
);

// Bash and Windows references resolve identically
macro_rules! tests_for_reference_forms {
    ($($name:ident => $template:expr),* $(,)?) => {
        paste::paste! {
            $(
                #[test]
                fn [<test_reference_form_ $name>]() {
                    let mut env = common::vars(&[("WORD", "World")]);
                    let doc = common::parse_in(&format!("K=Hello {}", $template), &mut env).unwrap();
                    assert_eq!(doc.get("K"), Some("Hello World"));
                }
            )*
        }
    }
}

tests_for_reference_forms!(
    unbraced => "$WORD",
    braced => "${WORD}",
    windows => "%WORD%",
    default_unused => "${WORD:-x}",
    assign_unused => "${WORD:=x}",
    required_present => "${WORD:?x}",
);
