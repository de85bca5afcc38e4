#[macro_export]
macro_rules! assert_none {
    ($e:expr) => {
        match $e {
            None => {}
            actual => panic!("expected `None`; actual={:?}", actual),
        }
    };
}

#[macro_export]
macro_rules! assert_some {
    ($e:expr) => {
        match $e {
            Some(v) => v,
            None => panic!("expected `Some`; actual=None"),
        }
    };
}

/// Asserts the length of anything with a `len()` method.
#[macro_export]
macro_rules! assert_len {
    ($e:expr, $len:expr) => {{
        let actual = $e.len();
        if actual != $len {
            panic!("expected len {}; actual={}", $len, actual);
        }
    }};
}
