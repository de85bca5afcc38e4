use crate::SqlDialect;

macro_rules! fmt {
    ($f:expr, $( $fragments:expr )*) => {{
        $(
            $fragments.to_sql($f);
        )*
    }};
}

/// Where a statement is being written, and for which dialect.
pub(crate) struct Formatter<'a> {
    pub(crate) dst: &'a mut String,
    pub(crate) dialect: &'a dyn SqlDialect,
}

impl<'a> Formatter<'a> {
    pub(crate) fn new(dst: &'a mut String, dialect: &'a dyn SqlDialect) -> Formatter<'a> {
        Formatter { dst, dialect }
    }
}

pub(crate) trait ToSql {
    fn to_sql(self, f: &mut Formatter<'_>);
}

impl ToSql for &str {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push_str(self);
    }
}

impl ToSql for &String {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push_str(self);
    }
}

impl ToSql for u64 {
    fn to_sql(self, f: &mut Formatter<'_>) {
        use std::fmt::Write;
        let _ = write!(f.dst, "{self}");
    }
}
