//! Essential-medicine membership.
//!
//! Matching is substring containment, not token equality: target `acyclovir`
//! matches ingredient `acyclovir sodium`, and also `valacyclovir hydrochloride`.
//! Salt and ester variants are recorded under longer ingredient names, so an
//! exact comparison would miss them. The false positives this admits are
//! removed with an explicit bad-word list instead of a stricter grammar.

use tracing::{debug, info};

use crate::entities::drug::DrugRecord;
use crate::entities::essential::EssentialTarget;

#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub essential: Vec<DrugRecord>,
    pub matched: usize,
    pub excluded: usize,
}

/// True when every target component is contained in a distinct ingredient and
/// the record has no ingredients left over.
pub(crate) fn matches_target(ingredients: &[String], target: &EssentialTarget) -> bool {
    if ingredients.len() != target.components.len() {
        return false;
    }

    // Shortest ingredient names are tried first so a word claims the tightest fit.
    let mut pool: Vec<&str> = ingredients.iter().map(String::as_str).collect();
    pool.sort_by_key(|name| name.len());

    let mut matched = 0;
    for word in &target.components {
        if let Some(idx) = pool.iter().position(|name| name.contains(word.as_str())) {
            pool.remove(idx);
            matched += 1;
        }
    }
    matched == target.components.len() && matched == ingredients.len()
}

pub(crate) fn find_bad_word<'a>(ingredients: &[String], bad_words: &'a [String]) -> Option<&'a str> {
    bad_words
        .iter()
        .find(|bad| ingredients.iter().any(|name| name.contains(bad.as_str())))
        .map(String::as_str)
}

/// Keeps the records that match at least one target and contain no bad word,
/// in input order.
pub fn keep_essential(
    mut drugs: Vec<DrugRecord>,
    targets: &[EssentialTarget],
    bad_words: &[String],
) -> MatchOutcome {
    for drug in &mut drugs {
        if let Some(target) = targets
            .iter()
            .find(|target| matches_target(&drug.ingredients, target))
        {
            debug!(trade_name = %drug.trade_name, essential = %target.name, "essential match");
            drug.is_essential = true;
        }
    }
    let mut tentative: Vec<DrugRecord> = drugs.into_iter().filter(|d| d.is_essential).collect();
    let matched = tentative.len();

    let mut excluded = 0;
    for drug in &mut tentative {
        if let Some(bad) = find_bad_word(&drug.ingredients, bad_words) {
            debug!(
                trade_name = %drug.trade_name,
                bad_word = bad,
                "excluding false-positive essential match"
            );
            drug.is_essential = false;
            excluded += 1;
        }
    }
    let essential: Vec<DrugRecord> = tentative.into_iter().filter(|d| d.is_essential).collect();

    info!(matched, excluded, kept = essential.len(), "essential matching done");
    MatchOutcome {
        essential,
        matched,
        excluded,
    }
}
