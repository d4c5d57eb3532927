use strsim::levenshtein;

/// Suggests the declared name nearest to `typo`. Ties go to the name listed
/// first; anything more than two edits away is not a suggestion.
pub fn find_similar_name<'a, I>(typo: &str, declared: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, usize)> = None;
    for name in declared {
        let distance = levenshtein(typo, name);
        if distance <= 2 && best.is_none_or(|(_, closest)| distance < closest) {
            best = Some((name, distance));
        }
    }
    best.map(|(name, _)| name)
}
