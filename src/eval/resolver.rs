use crate::errors::EvalError;
use crate::eval::bucketing::BucketingEngine;
use crate::eval::log_builder::EvalLogBuilder;
use crate::eval::rules::RuleEngine;
use crate::model::config::{display_opt, Configuration, RolloutVariation, Rule};
use crate::target::Target;
use crate::value::Value;
use std::sync::Arc;

/// The outcome of resolving a flag's own value.
#[derive(Debug, Default, Clone)]
pub(crate) struct Resolved {
    pub value: Option<Value>,
    pub rule: Option<Arc<Rule>>,
    pub variation: Option<Arc<RolloutVariation>>,
}

impl Resolved {
    fn off(config: &Configuration) -> Self {
        Self {
            value: config.off_value.clone(),
            ..Resolved::default()
        }
    }
}

/// Resolves the value of a flag from its on/off state, rules and distribution. Prerequisites
/// are not checked here.
pub(crate) struct ValueResolver<'a> {
    rules: RuleEngine<'a>,
    bucketing: BucketingEngine<'a>,
}

impl<'a> ValueResolver<'a> {
    pub fn new(rules: RuleEngine<'a>, bucketing: BucketingEngine<'a>) -> Self {
        Self { rules, bucketing }
    }

    pub fn resolve(
        &self,
        config: &Configuration,
        target: &Target,
        log: &mut EvalLogBuilder,
    ) -> Result<Resolved, EvalError> {
        if !config.on {
            if log.enabled() {
                log.new_ln(Some(
                    format!(
                        "Flag is off, serving off value '{}'.",
                        display_opt(&config.off_value)
                    )
                    .as_str(),
                ));
            }
            return Ok(Resolved::off(config));
        }

        // A distribution without rules goes straight to bucketing; otherwise the rule engine
        // runs and reports a flag that has neither.
        if !config.rules.is_empty() || config.distribution.is_none() {
            let matched =
                self.rules
                    .eval_rules(config.identifier.as_str(), &config.rules, target, log)?;
            match matched {
                Some(rule) if rule.value.is_some() => {
                    return Ok(Resolved {
                        value: rule.value.clone(),
                        rule: Some(rule),
                        variation: None,
                    });
                }
                Some(_) => {
                    log.new_ln(Some("Matched rule has no value, treating it as no match."));
                }
                None => {}
            }
        }

        let Some(distribution) = config.distribution.as_ref() else {
            if log.enabled() {
                log.new_ln(Some(
                    format!(
                        "No rule matched, serving off value '{}'.",
                        display_opt(&config.off_value)
                    )
                    .as_str(),
                ));
            }
            return Ok(Resolved::off(config));
        };

        let selected = self
            .bucketing
            .select(distribution, config.identifier.as_str(), target);
        if log.enabled() {
            log.new_ln(Some(
                format!("Evaluating distribution ({}):", distribution.strategy()).as_str(),
            ))
            .inc_indent();
            match &selected {
                Some(bucketed) => {
                    let bucket = match bucketed.bucket {
                        Some(bucket) => format!("bucket {bucket}"),
                        None => "bucketing key missing".to_owned(),
                    };
                    let outcome = if bucketed.enabled {
                        "selected"
                    } else {
                        "no tier covers the bucket, falling back to the last variation"
                    };
                    log.new_ln(Some(
                        format!("- {bucket} => {outcome} {}", bucketed.variation).as_str(),
                    ));
                }
                None => {
                    log.new_ln(Some("- no variations, serving no value"));
                }
            }
            log.dec_indent();
        }
        Ok(match selected {
            Some(bucketed) => Resolved {
                value: Some(bucketed.variation.variation.clone()),
                rule: None,
                variation: Some(bucketed.variation),
            },
            None => Resolved::default(),
        })
    }
}

#[cfg(test)]
mod resolver_tests {
    use super::*;
    use crate::expr::EvalexprEngine;
    use crate::hash::Hasher32;
    use crate::model::config::Distribution;
    use crate::provider::map::MapDataProvider;

    struct ConstHasher(u32);

    impl Hasher32 for ConstHasher {
        fn hash32(&self, _payload: &[u8]) -> u32 {
            self.0
        }
    }

    fn resolve(config: &Configuration, hash: u32) -> Result<Resolved, EvalError> {
        let provider = MapDataProvider::default();
        let hasher = ConstHasher(hash);
        let resolver = ValueResolver::new(
            RuleEngine::new(&provider, &EvalexprEngine),
            BucketingEngine::new(&hasher),
        );
        let mut log = EvalLogBuilder::new(true);
        resolver.resolve(config, &Target::new().attr("id", "u1"), &mut log)
    }

    fn distribution() -> Distribution {
        Distribution {
            bucket_by: Some("id".to_owned()),
            variations: vec![
                Arc::new(RolloutVariation {
                    variation: Value::from("v1"),
                    weight: 50,
                }),
                Arc::new(RolloutVariation {
                    variation: Value::from("v2"),
                    weight: 50,
                }),
            ],
        }
    }

    fn rule(expression: &str, value: &str) -> Arc<Rule> {
        Arc::new(Rule {
            expression: expression.to_owned(),
            value: Some(Value::from(value)),
        })
    }

    #[test]
    fn off_ignores_everything() {
        let config = Configuration {
            identifier: "f".to_owned(),
            on: false,
            off_value: Some(Value::from("off")),
            rules: vec![rule("", "A")],
            distribution: Some(distribution()),
            ..Configuration::default()
        };
        let resolved = resolve(&config, 0).unwrap();
        assert_eq!(resolved.value, Some(Value::from("off")));
        assert!(resolved.rule.is_none());
    }

    #[test]
    fn rule_before_distribution() {
        let config = Configuration {
            identifier: "f".to_owned(),
            on: true,
            rules: vec![rule("target.id == \"u1\"", "A")],
            distribution: Some(distribution()),
            ..Configuration::default()
        };
        let resolved = resolve(&config, 0).unwrap();
        assert_eq!(resolved.value, Some(Value::from("A")));
        assert!(resolved.rule.is_some());
        assert!(resolved.variation.is_none());
    }

    #[test]
    fn distribution_when_no_rule_matches() {
        let config = Configuration {
            identifier: "f".to_owned(),
            on: true,
            off_value: Some(Value::from("off")),
            rules: vec![rule("target.id == \"u2\"", "A")],
            distribution: Some(distribution()),
            ..Configuration::default()
        };
        // 75 % 100 + 1 = 76
        let resolved = resolve(&config, 75).unwrap();
        assert_eq!(resolved.value, Some(Value::from("v2")));
        assert!(resolved.variation.is_some());
    }

    #[test]
    fn distribution_only() {
        let config = Configuration {
            identifier: "f".to_owned(),
            on: true,
            distribution: Some(distribution()),
            ..Configuration::default()
        };
        let resolved = resolve(&config, 149).unwrap();
        assert_eq!(resolved.value, Some(Value::from("v1")));
    }

    #[test]
    fn empty_distribution_serves_nothing() {
        let config = Configuration {
            identifier: "f".to_owned(),
            on: true,
            off_value: Some(Value::from("off")),
            distribution: Some(Distribution::default()),
            ..Configuration::default()
        };
        let resolved = resolve(&config, 0).unwrap();
        assert_eq!(resolved.value, None);
    }

    #[test]
    fn no_match_serves_off_value() {
        let config = Configuration {
            identifier: "f".to_owned(),
            on: true,
            off_value: Some(Value::from("off")),
            rules: vec![rule("target.id == \"u2\"", "A")],
            ..Configuration::default()
        };
        let resolved = resolve(&config, 0).unwrap();
        assert_eq!(resolved.value, Some(Value::from("off")));
    }

    #[test]
    fn rule_without_value_is_no_match() {
        let valueless = Arc::new(Rule {
            expression: String::new(),
            value: None,
        });
        let config = Configuration {
            identifier: "f".to_owned(),
            on: true,
            off_value: Some(Value::from("off")),
            rules: vec![Arc::clone(&valueless), rule("", "A")],
            ..Configuration::default()
        };
        let resolved = resolve(&config, 0).unwrap();
        assert_eq!(resolved.value, Some(Value::from("off")));
        assert!(resolved.rule.is_none());

        let config = Configuration {
            rules: vec![valueless],
            distribution: Some(distribution()),
            ..config
        };
        assert_eq!(resolve(&config, 75).unwrap().value, Some(Value::from("v2")));
    }

    #[test]
    fn on_without_rules() {
        let config = Configuration {
            identifier: "f".to_owned(),
            on: true,
            off_value: Some(Value::from("off")),
            ..Configuration::default()
        };
        assert_eq!(
            resolve(&config, 0).unwrap_err(),
            EvalError::NoRulesSpecified("f".to_owned())
        );
    }
}
