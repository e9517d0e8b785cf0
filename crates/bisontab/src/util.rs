use std::fmt;

pub fn display_fn<F>(f: F) -> impl fmt::Display
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    struct DisplayFn<F> {
        f: F,
    }
    impl<F> fmt::Display for DisplayFn<F>
    where
        F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
    {
        fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            (self.f)(formatter)
        }
    }
    DisplayFn { f }
}

/// Write `items` as a `", "`-separated list, starting a new line prefixed
/// with `indent` whenever the current line would exceed `width` columns.
///
/// A single item longer than `width` is never split.
pub fn write_wrapped<I, T>(
    f: &mut fmt::Formatter<'_>,
    indent: &str,
    width: usize,
    items: I,
) -> fmt::Result
where
    I: IntoIterator<Item = T>,
    T: fmt::Display,
{
    let mut column = 0;
    for (i, item) in items.into_iter().enumerate() {
        let item = item.to_string();
        if i > 0 {
            f.write_str(",")?;
            if column + item.len() + 2 > width {
                write!(f, "\n{}", indent)?;
                column = 0;
            } else {
                f.write_str(" ")?;
                column += 2;
            }
        }
        f.write_str(&item)?;
        column += item.len() + 1;
    }
    Ok(())
}
