#[macro_export]
macro_rules! range_var {
    ($name:expr) => {
        $crate::ast::common::RangeVar::new($name)
    };
    ($schema:expr, $name:expr) => {
        $crate::ast::common::RangeVar::qualified($schema, $name)
    };
}

#[macro_export]
macro_rules! type_name {
    ($name:expr) => {
        $crate::ast::type_name::TypeName::new($name)
    };
    ($name:expr, $($typmod:expr),+) => {
        $crate::ast::type_name::TypeName::new($name).with_typmods(&[$($typmod),+])
    };
}
