use crate::errors::EvalError;
use crate::eval::log_builder::EvalLogBuilder;
use crate::eval::resolver::ValueResolver;
use crate::logger::{Logger, PREREQUISITE_SKIPPED_EVENT_ID};
use crate::model::config::{display_opt, Configuration, Prerequisite};
use crate::model::enums::PrerequisitePolicy;
use crate::provider::DataProvider;
use crate::target::Target;
use crate::value::Value;
use log::Level;
use std::collections::{HashMap, HashSet};

struct Frame {
    identifier: String,
    prerequisites: Vec<Prerequisite>,
    next: usize,
}

impl Frame {
    fn new(config: &Configuration) -> Self {
        Self {
            identifier: config.identifier.clone(),
            prerequisites: config.prerequisites.clone(),
            next: 0,
        }
    }
}

/// Verifies the prerequisite chain of a flag.
///
/// The chain is walked depth first with an explicit stack. Each prerequisite flag is resolved
/// once per check and its own prerequisites are expanded once, so diamond shaped dependencies
/// are cheap while a flag that shows up again on the current path is reported as a cycle.
pub(crate) struct PrerequisiteChecker<'a> {
    provider: &'a dyn DataProvider,
    resolver: &'a ValueResolver<'a>,
    logger: &'a dyn Logger,
    policy: PrerequisitePolicy,
}

impl<'a> PrerequisiteChecker<'a> {
    pub fn new(
        provider: &'a dyn DataProvider,
        resolver: &'a ValueResolver<'a>,
        logger: &'a dyn Logger,
        policy: PrerequisitePolicy,
    ) -> Self {
        Self {
            provider,
            resolver,
            logger,
            policy,
        }
    }

    pub fn check(
        &self,
        config: &Configuration,
        target: &Target,
        log: &mut EvalLogBuilder,
    ) -> Result<(), EvalError> {
        if config.prerequisites.is_empty() {
            return Ok(());
        }
        if log.enabled() {
            log.new_ln(Some("Checking prerequisites:")).inc_indent();
        }
        let result = self.walk(config, target, log);
        log.dec_indent();
        result
    }

    fn walk(
        &self,
        config: &Configuration,
        target: &Target,
        log: &mut EvalLogBuilder,
    ) -> Result<(), EvalError> {
        let mut stack = vec![Frame::new(config)];
        let mut expanded = HashSet::from([config.identifier.clone()]);
        let mut resolved: HashMap<String, Option<Value>> = HashMap::new();

        loop {
            let (flag, prerequisite) = {
                let Some(frame) = stack.last_mut() else {
                    break;
                };
                let next = frame.prerequisites.get(frame.next).cloned();
                match next {
                    Some(prerequisite) => {
                        frame.next += 1;
                        (frame.identifier.clone(), prerequisite)
                    }
                    None => {
                        stack.pop();
                        continue;
                    }
                }
            };
            let id = prerequisite.identifier.as_str();

            if stack.iter().any(|frame| frame.identifier == id) {
                let path = stack
                    .iter()
                    .map(|frame| frame.identifier.as_str())
                    .chain(std::iter::once(id))
                    .map(|identifier| format!("'{identifier}'"))
                    .collect::<Vec<String>>()
                    .join(" -> ");
                return Err(EvalError::PrerequisiteCycle(path));
            }

            let prerequisite_config = match self.provider.get_configuration(id) {
                Ok(prerequisite_config) => prerequisite_config,
                Err(err) => match self.policy {
                    PrerequisitePolicy::FailOpen => {
                        self.skip(flag.as_str(), id, &err, log);
                        continue;
                    }
                    PrerequisitePolicy::FailClosed => return Err(err),
                },
            };

            let actual = match resolved.get(id) {
                Some(value) => value.clone(),
                None => {
                    log.inc_indent();
                    let result = self.resolver.resolve(&prerequisite_config, target, log);
                    log.dec_indent();
                    let value = result?.value;
                    resolved.insert(id.to_owned(), value.clone());
                    value
                }
            };
            let satisfied = actual.as_ref() == Some(&prerequisite.value);
            if log.enabled() {
                log.new_ln(Some(
                    format!(
                        "- '{flag}' requires {prerequisite}, got '{}' => {}",
                        display_opt(&actual),
                        if satisfied { "satisfied" } else { "not satisfied" }
                    )
                    .as_str(),
                ));
            }
            if !satisfied {
                return Err(EvalError::PrerequisiteNotSatisfied {
                    flag,
                    prerequisite: prerequisite.identifier,
                    expected: prerequisite.value.to_string(),
                    actual: display_opt(&actual),
                });
            }

            if !prerequisite_config.prerequisites.is_empty()
                && expanded.insert(prerequisite.identifier.clone())
            {
                stack.push(Frame::new(&prerequisite_config));
            }
        }
        Ok(())
    }

    fn skip(&self, flag: &str, prerequisite: &str, err: &EvalError, log: &mut EvalLogBuilder) {
        let reason = if err.is_not_found() {
            "was not found".to_owned()
        } else {
            format!("could not be fetched ({err})")
        };
        let message = format!(
            "Prerequisite flag '{prerequisite}' of '{flag}' {reason}, treating it as satisfied."
        );
        if self.logger.enabled(Level::Warn) {
            self.logger
                .log(Level::Warn, PREREQUISITE_SKIPPED_EVENT_ID, message.as_str());
        }
        log.new_ln(Some(format!("- {message}").as_str()));
    }
}
