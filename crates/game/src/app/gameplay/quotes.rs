use std::collections::BTreeMap;

use rand::Rng;

/// Author -> quotes, in author order.
pub(crate) type QuoteCorpus = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default)]
pub(crate) struct QuoteComposer {
    corpus: QuoteCorpus,
}

impl QuoteComposer {
    pub(crate) fn new(corpus: QuoteCorpus) -> Self {
        Self { corpus }
    }

    pub(crate) fn author_count(&self) -> usize {
        self.corpus.len()
    }

    /// Uniform author, then uniform quote of that author. Empty when either is missing.
    pub(crate) fn random_quote<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.pick_quote(rng).map(str::to_string).unwrap_or_default()
    }

    /// `parts` fragments of random quotes, space-joined. Draws that land on an author
    /// without quotes contribute nothing.
    pub(crate) fn composed_quote<R: Rng + ?Sized>(&self, parts: usize, rng: &mut R) -> String {
        if self.corpus.is_empty() {
            return String::new();
        }
        let mut segments = Vec::with_capacity(parts);
        for _ in 0..parts {
            if let Some(quote) = self.pick_quote(rng) {
                segments.push(segment(quote, rng));
            }
        }
        segments.join(" ")
    }

    fn pick_quote<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if self.corpus.is_empty() {
            return None;
        }
        let author_index = rng.random_range(0..self.corpus.len());
        let quotes = self.corpus.values().nth(author_index)?;
        if quotes.is_empty() {
            return None;
        }
        quotes
            .get(rng.random_range(0..quotes.len()))
            .map(String::as_str)
    }
}

/// Contiguous run of 4 to 8 words starting in the first `len - 4` words.
pub(crate) fn segment<R: Rng + ?Sized>(quote: &str, rng: &mut R) -> String {
    let words: Vec<&str> = quote.split(' ').collect();
    let start_span = words.len().saturating_sub(4).max(1);
    let start = rng.random_range(0..start_span);
    let end = words.len().min(start + rng.random_range(4..9));
    words[start..end].join(" ")
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn corpus(entries: &[(&str, &[&str])]) -> QuoteCorpus {
        entries
            .iter()
            .map(|(author, quotes)| {
                (
                    author.to_string(),
                    quotes.iter().map(|quote| quote.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn empty_corpus_yields_empty_text() {
        let composer = QuoteComposer::default();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(composer.random_quote(&mut rng), "");
        assert_eq!(composer.composed_quote(3, &mut rng), "");
    }

    #[test]
    fn author_without_quotes_yields_empty_text() {
        let composer = QuoteComposer::new(corpus(&[("silent", &[])]));
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(composer.random_quote(&mut rng), "");
        assert_eq!(composer.composed_quote(2, &mut rng), "");
    }

    #[test]
    fn random_quote_returns_a_whole_corpus_entry() {
        let composer = QuoteComposer::new(corpus(&[
            ("a", &["first quote here"]),
            ("b", &["second one", "third"]),
        ]));
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..32 {
            let quote = composer.random_quote(&mut rng);
            assert!(["first quote here", "second one", "third"].contains(&quote.as_str()));
        }
    }

    #[test]
    fn segment_length_is_bounded() {
        let quote = "one two three four five six seven eight nine ten eleven twelve";
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..200 {
            let piece = segment(quote, &mut rng);
            let count = piece.split(' ').count();
            assert!((4..=8).contains(&count), "segment `{piece}`");
            assert!(quote.contains(&piece));
        }
    }

    #[test]
    fn short_quotes_are_kept_whole() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            assert_eq!(segment("tiny quote", &mut rng), "tiny quote");
        }
    }

    #[test]
    fn composed_quote_joins_fragments_from_the_corpus() {
        let composer = QuoteComposer::new(corpus(&[("a", &["alpha beta gamma delta"])]));
        let mut rng = StdRng::seed_from_u64(11);

        assert_eq!(
            composer.composed_quote(2, &mut rng),
            "alpha beta gamma delta alpha beta gamma delta"
        );
    }
}
