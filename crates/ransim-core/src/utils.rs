/// Index of the first strictly greatest value. Later values only win if they are larger, so
/// ties go to the earliest candidate.
pub(crate) fn first_max<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, value) in values.into_iter().enumerate() {
        if best.map_or(true, |(_, top)| value > top) {
            best = Some((i, value));
        }
    }
    best.map(|(i, _)| i)
}
