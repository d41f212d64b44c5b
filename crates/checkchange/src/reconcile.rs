use checkchange_types::NlpAnnotationService;
use serde::Serialize;
use tracing::debug;

use crate::analyzer::{AnalyzedSentence, CheckError};

/// Outcome of applying one change request to an order.
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    /// The new order, one formatted line per item.
    pub lines: Vec<String>,
    /// Index of the order item the request was matched to.
    pub selected: usize,
    /// Similarity of every order item to the request, in order.
    pub similarities: Vec<f32>,
    /// Quantity given to the new entry.
    pub quantity: u64,
    pub total_replace: bool,
}

/// Matches a change request to an order item and rewrites the order.
pub struct OrderReconciler<'a> {
    nlp: &'a dyn NlpAnnotationService,
}

impl<'a> OrderReconciler<'a> {
    pub fn new(nlp: &'a dyn NlpAnnotationService) -> Self {
        Self { nlp }
    }

    pub fn reconcile<S: AsRef<str>>(
        &self,
        order: &[S],
        request: &str,
    ) -> Result<Reconciliation, CheckError> {
        let request = AnalyzedSentence::analyze(request, self.nlp)?;
        let items = order
            .iter()
            .map(|item| AnalyzedSentence::analyze(item.as_ref(), self.nlp))
            .collect::<Result<Vec<_>, _>>()?;

        let similarities: Vec<f32> = items
            .iter()
            .map(|item| item.similarity(request.noun_phrases(), self.nlp))
            .collect();
        let selected = most_similar(&similarities).ok_or(CheckError::EmptyOrder)?;
        let target_quantity = items[selected].quantity();

        let total_replace = request.is_total_replace();
        let quantity = if total_replace {
            target_quantity
        } else if request.quantity() == 0 {
            1
        } else {
            request.quantity()
        };
        let request = request.with_quantity(quantity);

        debug!(
            request = request.raw_text(),
            selected,
            item = items[selected].raw_text(),
            score = similarities[selected],
            quantity,
            total_replace,
            "matched change request"
        );

        let mut lines = Vec::with_capacity(items.len() + 1);
        for (idx, item) in items.into_iter().enumerate() {
            if idx != selected {
                lines.push(item.to_string());
            } else if item.quantity() > quantity {
                let remaining = item.quantity() - quantity;
                lines.push(item.with_quantity(remaining).to_string());
            }
        }
        lines.push(request.to_string());

        Ok(Reconciliation {
            lines,
            selected,
            similarities,
            quantity,
            total_replace,
        })
    }
}

/// Apply `request` to `order` and return the new order lines.
pub fn reconcile<S: AsRef<str>>(
    order: &[S],
    request: &str,
    nlp: &dyn NlpAnnotationService,
) -> Result<Vec<String>, CheckError> {
    OrderReconciler::new(nlp)
        .reconcile(order, request)
        .map(|outcome| outcome.lines)
}

/// Split a comma-separated order into trimmed, non-empty items.
pub fn parse_order(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Index of the highest score; the earliest wins a tie. NaN never wins.
fn most_similar(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        let score = if score.is_nan() {
            f32::NEG_INFINITY
        } else {
            score
        };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::menu_pipeline;

    const CHECK: [&str; 2] = ["2 large pepperoni pizzas", "3 sugar free sodas"];

    fn change(request: &str) -> Vec<String> {
        reconcile(&CHECK, request, &menu_pipeline()).unwrap()
    }

    #[test]
    fn partial_change_keeps_the_rest() {
        assert_eq!(
            change("Make one of the pizzas small"),
            [
                "1 large pepperoni pizzas",
                "3 sugar free sodas",
                "1 small pizzas"
            ]
        );
    }

    #[test]
    fn explicit_count_consumes_the_item() {
        assert_eq!(
            change("Make 3 sodas regular"),
            ["2 large pepperoni pizzas", "3 regular sodas"]
        );
    }

    #[test]
    fn plural_request_replaces_everything() {
        assert_eq!(
            change("Change the sodas with cocktails"),
            ["2 large pepperoni pizzas", "3  cocktails"]
        );
        assert_eq!(
            change("Change the pizzas for pastas"),
            ["3 sugar free sodas", "2  pastas"]
        );
    }

    #[test]
    fn singular_request_takes_one() {
        assert_eq!(
            change("Change a soda for wine"),
            ["2 large pepperoni pizzas", "2 sugar free sodas", "1  wine"]
        );
    }

    #[test]
    fn matches_by_meaning_not_spelling() {
        assert_eq!(
            change("Make two of the drinks a regular"),
            [
                "2 large pepperoni pizzas",
                "1 sugar free sodas",
                "2 regular drinks"
            ]
        );
    }

    #[test]
    fn over_consumption_drops_the_item() {
        let outcome = OrderReconciler::new(&menu_pipeline())
            .reconcile(&CHECK, "Make 5 sodas regular")
            .unwrap();
        assert_eq!(outcome.selected, 1);
        assert_eq!(outcome.quantity, 5);
        assert!(!outcome.total_replace);
        assert_eq!(
            outcome.lines,
            ["2 large pepperoni pizzas", "5 regular sodas"]
        );
    }

    const MENU: [&str; 3] = [
        "1 small pasta",
        "2 large pepperoni pizzas",
        "3 sugar free sodas",
    ];

    #[test]
    fn middle_item_keeps_its_remainder_in_place() {
        let outcome = OrderReconciler::new(&menu_pipeline())
            .reconcile(&MENU, "Change the pizzas for wine")
            .unwrap();
        assert_eq!(outcome.selected, 1);
        assert_eq!(
            outcome.lines,
            [
                "1 small pasta",
                "1 large pepperoni pizzas",
                "3 sugar free sodas",
                "1  wine"
            ]
        );
    }

    #[test]
    fn consumed_middle_item_is_removed() {
        let outcome = OrderReconciler::new(&menu_pipeline())
            .reconcile(&MENU, "Make 2 pizzas small")
            .unwrap();
        assert_eq!(outcome.selected, 1);
        assert_eq!(
            outcome.lines,
            ["1 small pasta", "3 sugar free sodas", "2 small pizzas"]
        );
    }

    #[test]
    fn untouched_items_keep_their_order() {
        let order = [MENU[0], MENU[1], MENU[2], "1 wine"];
        assert_eq!(
            reconcile(&order, "Make one of the pizzas small", &menu_pipeline()).unwrap(),
            [
                "1 small pasta",
                "1 large pepperoni pizzas",
                "3 sugar free sodas",
                "1  wine",
                "1 small pizzas"
            ]
        );
    }

    #[test]
    fn reports_selection_details() {
        let outcome = OrderReconciler::new(&menu_pipeline())
            .reconcile(&CHECK, "Change the sodas with cocktails")
            .unwrap();
        assert_eq!(outcome.selected, 1);
        assert_eq!(outcome.similarities.len(), 2);
        assert!(outcome.similarities[1] > outcome.similarities[0]);
        assert!(outcome.total_replace);
        assert_eq!(outcome.quantity, 3);
    }

    #[test]
    fn unrelated_request_still_matches_first_best() {
        // Nothing resembles a calzone; both items score zero and the first wins.
        assert_eq!(
            change("Add a calzone"),
            [
                "1 large pepperoni pizzas",
                "3 sugar free sodas",
                "1  calzone"
            ]
        );
    }

    #[test]
    fn empty_order_is_an_error() {
        let empty: [&str; 0] = [];
        let err = reconcile(&empty, "Make it small", &menu_pipeline()).unwrap_err();
        assert!(matches!(err, CheckError::EmptyOrder));
    }

    #[test]
    fn nounless_request_is_an_error() {
        let err = reconcile(&CHECK, "Make", &menu_pipeline()).unwrap_err();
        assert!(matches!(err, CheckError::EmptyNounPhrase { .. }));
    }

    #[test]
    fn splits_comma_separated_orders() {
        assert_eq!(
            parse_order("2 large pepperoni pizzas, 3 sugar free sodas,,"),
            CHECK
        );
        assert!(parse_order(" , ").is_empty());
    }

    #[test]
    fn tie_goes_to_the_first_item() {
        assert_eq!(most_similar(&[0.5, 0.9, 0.9]), Some(1));
        assert_eq!(most_similar(&[0.0, 0.0]), Some(0));
        assert_eq!(most_similar(&[f32::NAN, 0.1]), Some(1));
        assert_eq!(most_similar(&[]), None);
    }
}
