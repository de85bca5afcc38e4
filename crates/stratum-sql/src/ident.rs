use crate::{
    fmt::{Formatter, ToSql},
    naming,
};

/// A column name, quoted when reserved.
pub(crate) struct Ident<S>(pub(crate) S);

/// `alias.column`
pub(crate) struct Qualified<'a, S>(pub(crate) &'a str, pub(crate) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push_str(&naming::column_name(self.0.as_ref()));
    }
}

impl<S: AsRef<str>> ToSql for Qualified<'_, S> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, self.0 "." Ident(self.1));
    }
}

impl<S: AsRef<str>> Qualified<'_, S> {
    pub(crate) fn render(&self) -> String {
        format!("{}.{}", self.0, naming::column_name(self.1.as_ref()))
    }
}
