use crate::fmt::{Formatter, ToSql};

/// Comma delimited
pub(crate) struct Comma<L>(pub(crate) L);

/// ` AND ` or ` OR ` delimited
pub(crate) struct Join<L>(pub(crate) &'static str, pub(crate) L);

impl<L> ToSql for Comma<L>
where
    L: IntoIterator,
    L::Item: ToSql,
{
    fn to_sql(self, f: &mut Formatter<'_>) {
        let mut s = "";
        for i in self.0 {
            fmt!(f, s i);
            s = ", ";
        }
    }
}

impl<L> ToSql for Join<L>
where
    L: IntoIterator,
    L::Item: ToSql,
{
    fn to_sql(self, f: &mut Formatter<'_>) {
        let Join(sep, list) = self;
        let mut s = "";
        for i in list {
            fmt!(f, s i);
            s = sep;
        }
    }
}
