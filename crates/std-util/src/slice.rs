/// Asserts every item yielded by the expression is distinct.
#[macro_export]
macro_rules! assert_unique {
    ($e:expr) => {{
        let mut seen = std::collections::HashSet::new();
        for item in $e {
            if !seen.insert(item) {
                panic!("duplicate item: {:?}", item);
            }
        }
    }};
}
