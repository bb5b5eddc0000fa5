//! The recommendation decision table.
//!
//! An ordered list of (predicate, career) pairs evaluated first-match-wins.
//! The ordering is a behavioral contract: predicates overlap, and e.g.
//! `interest = analyzing, strength = creativity` must resolve to Data
//! Scientist because that rule is evaluated before the UX Designer rule.

use crate::catalog::{DATA_SCIENTIST, PRODUCT_MANAGER, SOFTWARE_ENGINEER, UX_DESIGNER};
use crate::types::{AssessmentAnswers, Interest, Strength};

/// Map a completed answer set to a career key. Pure and total; every input
/// resolves to one of the four known careers.
///
/// The `environment` answer is recorded with the assessment but plays no
/// part in the decision.
pub fn recommend(answers: &AssessmentAnswers) -> &'static str {
    if answers.interest == Interest::Building && answers.strength == Strength::Logic {
        return SOFTWARE_ENGINEER;
    }
    if answers.interest == Interest::Analyzing {
        return DATA_SCIENTIST;
    }
    if answers.interest == Interest::Leading {
        return PRODUCT_MANAGER;
    }
    if answers.interest == Interest::Designing || answers.strength == Strength::Creativity {
        return UX_DESIGNER;
    }
    SOFTWARE_ENGINEER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TemplateCatalog;
    use crate::types::WorkEnvironment;

    const INTERESTS: [Interest; 4] = [
        Interest::Building,
        Interest::Analyzing,
        Interest::Leading,
        Interest::Designing,
    ];
    const ENVIRONMENTS: [WorkEnvironment; 3] = [
        WorkEnvironment::Remote,
        WorkEnvironment::Office,
        WorkEnvironment::Hybrid,
    ];
    const STRENGTHS: [Strength; 3] = [
        Strength::Logic,
        Strength::Creativity,
        Strength::Communication,
    ];

    fn answers(
        interest: Interest,
        environment: WorkEnvironment,
        strength: Strength,
    ) -> AssessmentAnswers {
        AssessmentAnswers {
            interest,
            environment,
            strength,
        }
    }

    #[test]
    fn every_combination_resolves_to_a_cataloged_career() {
        let catalog = TemplateCatalog::builtin();
        for interest in INTERESTS {
            for environment in ENVIRONMENTS {
                for strength in STRENGTHS {
                    let career = recommend(&answers(interest, environment, strength));
                    assert!(
                        catalog.get(career).is_some(),
                        "{career:?} missing from catalog for {interest:?}/{environment:?}/{strength:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn equal_inputs_give_equal_outputs() {
        let a = answers(Interest::Leading, WorkEnvironment::Hybrid, Strength::Logic);
        let b = answers(Interest::Leading, WorkEnvironment::Hybrid, Strength::Logic);
        assert_eq!(recommend(&a), recommend(&b));
    }

    #[test]
    fn builder_with_logic_is_software_engineer() {
        let a = answers(Interest::Building, WorkEnvironment::Office, Strength::Logic);
        assert_eq!(recommend(&a), SOFTWARE_ENGINEER);
    }

    #[test]
    fn analyzing_beats_creativity_by_rule_order() {
        // Satisfies both the Data Scientist and UX Designer predicates; the
        // earlier rule must win.
        let a = answers(
            Interest::Analyzing,
            WorkEnvironment::Remote,
            Strength::Creativity,
        );
        assert_eq!(recommend(&a), DATA_SCIENTIST);
    }

    #[test]
    fn leading_is_product_manager_regardless_of_strength() {
        for strength in STRENGTHS {
            let a = answers(Interest::Leading, WorkEnvironment::Remote, strength);
            assert_eq!(recommend(&a), PRODUCT_MANAGER);
        }
    }

    #[test]
    fn designing_or_creative_is_ux_designer() {
        let designing = answers(
            Interest::Designing,
            WorkEnvironment::Hybrid,
            Strength::Logic,
        );
        assert_eq!(recommend(&designing), UX_DESIGNER);

        let creative = answers(
            Interest::Building,
            WorkEnvironment::Hybrid,
            Strength::Creativity,
        );
        assert_eq!(recommend(&creative), UX_DESIGNER);
    }

    #[test]
    fn fallback_is_software_engineer() {
        let a = answers(
            Interest::Building,
            WorkEnvironment::Remote,
            Strength::Communication,
        );
        assert_eq!(recommend(&a), SOFTWARE_ENGINEER);
    }

    #[test]
    fn environment_never_changes_the_outcome() {
        for interest in INTERESTS {
            for strength in STRENGTHS {
                let outcomes: Vec<_> = ENVIRONMENTS
                    .iter()
                    .map(|&environment| recommend(&answers(interest, environment, strength)))
                    .collect();
                assert!(outcomes.windows(2).all(|w| w[0] == w[1]));
            }
        }
    }
}
