use std::collections::HashSet;

use super::entity::{AlertRecord, AlertStatus, MessageType, NotificationCategory};

/// Phrases in a Severe Thunderstorm Warning that flag a possible tornado.
const TORNADO_POSSIBLE_PHRASES: [&str; 3] =
    ["tornado possible", "possible tornado", "radar indicated tornado"];

/// Outcome of classifying one feed record against the send history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Notify(ClassifiedAlert),
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedAlert {
    pub category: NotificationCategory,
    /// Severe Thunderstorm Warning text mentioned a possible tornado.
    pub tornado_possible: bool,
    /// Re-notification of an already-sent alert after escalation.
    pub is_update: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Non-Actual status or a cancellation message.
    NotActionable,
    /// Event name outside the known category set.
    UnknownEvent,
    /// Winter-group category while the winter toggle is off.
    WinterDisabled,
    /// Resolved category has no configured destination.
    NoDestination,
    /// Alert id already notified and this is not an update.
    AlreadyNotified,
    /// Update that does not strictly escalate the stored category.
    NonEscalatingUpdate,
}

/// Maps a raw feed record plus send history to a notification decision.
///
/// Rule pipeline: actionability → base category → tornado aux/escalation
/// text scan → destination check → dedupe/escalation gate.
#[derive(Debug)]
pub struct Classifier {
    winter_enabled: bool,
    configured: HashSet<NotificationCategory>,
}

impl Classifier {
    pub fn new(winter_enabled: bool, configured: HashSet<NotificationCategory>) -> Self {
        Self {
            winter_enabled,
            configured,
        }
    }

    /// Hot-swap the destination set and winter toggle on config reload.
    pub fn reload(&mut self, winter_enabled: bool, configured: HashSet<NotificationCategory>) {
        self.winter_enabled = winter_enabled;
        self.configured = configured;
    }

    /// Classify one record. `prior` is the category stored in the dedupe
    /// store for this alert id, if it was already notified.
    pub fn classify(
        &self,
        record: &AlertRecord,
        prior: Option<NotificationCategory>,
    ) -> Classification {
        if record.status != AlertStatus::Actual || record.message_type == MessageType::Cancel {
            return Classification::Skip(SkipReason::NotActionable);
        }

        let base = match NotificationCategory::from_event(&record.event) {
            Some(c) => c,
            None => return Classification::Skip(SkipReason::UnknownEvent),
        };

        if base.is_winter() && !self.winter_enabled {
            return Classification::Skip(SkipReason::WinterDisabled);
        }

        let tornado_possible = base == NotificationCategory::SevereThunderstormWarning
            && TORNADO_POSSIBLE_PHRASES
                .iter()
                .any(|phrase| text_contains(record, phrase));

        let category = if base == NotificationCategory::TornadoWarning {
            escalate_tornado_warning(record)
        } else {
            base
        };

        if !self.configured.contains(&category) {
            return Classification::Skip(SkipReason::NoDestination);
        }

        match prior {
            None => Classification::Notify(ClassifiedAlert {
                category,
                tornado_possible,
                is_update: false,
            }),
            Some(prev) if record.message_type == MessageType::Update => {
                let escalates = match (prev.escalation_rank(), category.escalation_rank()) {
                    (Some(old), Some(new)) => new > old,
                    _ => false,
                };
                if escalates {
                    Classification::Notify(ClassifiedAlert {
                        category,
                        tornado_possible,
                        is_update: true,
                    })
                } else {
                    Classification::Skip(SkipReason::NonEscalatingUpdate)
                }
            }
            Some(_) => Classification::Skip(SkipReason::AlreadyNotified),
        }
    }
}

/// Escalation checks for a Tornado Warning, in strict priority order.
fn escalate_tornado_warning(record: &AlertRecord) -> NotificationCategory {
    if text_contains(record, "tornado emergency") {
        NotificationCategory::TornadoEmergency
    } else if text_contains(record, "particularly dangerous situation") {
        NotificationCategory::PdsTornadoWarning
    } else if text_contains(record, "observed") || text_contains(record, "confirmed") {
        NotificationCategory::TornadoObserved
    } else {
        NotificationCategory::TornadoWarning
    }
}

/// Case-insensitive substring match against headline OR description.
fn text_contains(record: &AlertRecord, needle: &str) -> bool {
    record.headline.to_lowercase().contains(needle)
        || record.description.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(id: &str, event: &str) -> AlertRecord {
        AlertRecord {
            id: id.to_string(),
            event: event.to_string(),
            status: AlertStatus::Actual,
            message_type: MessageType::Alert,
            headline: String::new(),
            description: "Heavy rain expected.".to_string(),
            area_desc: "Wayne, MI".to_string(),
            sent_at: None,
            expires_at: None,
            sender_name: "NWS Detroit".to_string(),
            source_url: "https://example.test/alert/1".to_string(),
        }
    }

    fn all_configured() -> Classifier {
        Classifier::new(true, NotificationCategory::ALL.into_iter().collect())
    }

    fn expect_notify(c: Classification) -> ClassifiedAlert {
        match c {
            Classification::Notify(n) => n,
            Classification::Skip(reason) => panic!("expected notify, got skip: {reason:?}"),
        }
    }

    #[test]
    fn non_actual_status_skipped() {
        let classifier = all_configured();
        let mut record = make_record("a1", "Tornado Warning");
        record.status = AlertStatus::Other;
        assert_eq!(
            classifier.classify(&record, None),
            Classification::Skip(SkipReason::NotActionable)
        );
    }

    #[test]
    fn cancel_message_skipped() {
        let classifier = all_configured();
        let mut record = make_record("a1", "Tornado Warning");
        record.message_type = MessageType::Cancel;
        assert_eq!(
            classifier.classify(&record, None),
            Classification::Skip(SkipReason::NotActionable)
        );
    }

    #[test]
    fn unknown_event_skipped() {
        let classifier = all_configured();
        let record = make_record("a1", "Dense Fog Advisory");
        assert_eq!(
            classifier.classify(&record, None),
            Classification::Skip(SkipReason::UnknownEvent)
        );
    }

    #[test]
    fn winter_category_gated_by_toggle() {
        let configured: HashSet<_> = NotificationCategory::ALL.into_iter().collect();
        let classifier = Classifier::new(false, configured.clone());
        let record = make_record("w1", "Blizzard Warning");
        assert_eq!(
            classifier.classify(&record, None),
            Classification::Skip(SkipReason::WinterDisabled)
        );

        let classifier = Classifier::new(true, configured);
        let notified = expect_notify(classifier.classify(&record, None));
        assert_eq!(notified.category, NotificationCategory::BlizzardWarning);
    }

    #[test]
    fn thunderstorm_tornado_possible_flag_set() {
        let classifier = all_configured();
        let mut record = make_record("t1", "Severe Thunderstorm Warning");
        record.description = "RADAR INDICATED TORNADO near the storm core.".to_string();
        let notified = expect_notify(classifier.classify(&record, None));
        assert_eq!(
            notified.category,
            NotificationCategory::SevereThunderstormWarning
        );
        assert!(notified.tornado_possible);
    }

    #[test]
    fn tornado_phrase_outside_thunderstorm_ignored() {
        let classifier = all_configured();
        let mut record = make_record("h1", "Heat Advisory");
        record.description = "tornado possible".to_string();
        let notified = expect_notify(classifier.classify(&record, None));
        assert!(!notified.tornado_possible);
    }

    #[test]
    fn tornado_warning_escalation_priority() {
        let classifier = all_configured();

        let mut record = make_record("e1", "Tornado Warning");
        record.headline =
            "TORNADO EMERGENCY for a PARTICULARLY DANGEROUS SITUATION, tornado observed"
                .to_string();
        let notified = expect_notify(classifier.classify(&record, None));
        assert_eq!(notified.category, NotificationCategory::TornadoEmergency);

        record.headline = "PARTICULARLY DANGEROUS SITUATION, tornado observed".to_string();
        let notified = expect_notify(classifier.classify(&record, None));
        assert_eq!(notified.category, NotificationCategory::PdsTornadoWarning);

        record.headline = "Tornado confirmed on the ground".to_string();
        let notified = expect_notify(classifier.classify(&record, None));
        assert_eq!(notified.category, NotificationCategory::TornadoObserved);

        record.headline = "Take cover now".to_string();
        let notified = expect_notify(classifier.classify(&record, None));
        assert_eq!(notified.category, NotificationCategory::TornadoWarning);
    }

    #[test]
    fn pds_scenario_from_headline() {
        // Spec-style A2: PDS phrase in the headline only.
        let classifier = all_configured();
        let mut record = make_record("A2", "Tornado Warning");
        record.headline = "...PARTICULARLY DANGEROUS SITUATION...".to_string();
        let notified = expect_notify(classifier.classify(&record, None));
        assert_eq!(notified.category, NotificationCategory::PdsTornadoWarning);
        assert!(!notified.is_update);
    }

    #[test]
    fn unconfigured_destination_skipped() {
        let configured: HashSet<_> = [NotificationCategory::TornadoWarning].into_iter().collect();
        let classifier = Classifier::new(true, configured);
        // Escalates to PDS, which has no destination.
        let mut record = make_record("p1", "Tornado Warning");
        record.description = "particularly dangerous situation".to_string();
        assert_eq!(
            classifier.classify(&record, None),
            Classification::Skip(SkipReason::NoDestination)
        );
    }

    #[test]
    fn duplicate_alert_skipped() {
        let classifier = all_configured();
        let record = make_record("d1", "Tornado Warning");
        let first = expect_notify(classifier.classify(&record, None));
        let second = classifier.classify(&record, Some(first.category));
        assert_eq!(second, Classification::Skip(SkipReason::AlreadyNotified));
    }

    #[test]
    fn escalating_update_renotifies() {
        let classifier = all_configured();
        let mut record = make_record("A2", "Tornado Warning");
        record.message_type = MessageType::Update;
        record.headline = "this is now a tornado emergency".to_string();

        let notified = expect_notify(
            classifier.classify(&record, Some(NotificationCategory::PdsTornadoWarning)),
        );
        assert_eq!(notified.category, NotificationCategory::TornadoEmergency);
        assert!(notified.is_update);
    }

    #[test]
    fn repeated_pds_update_does_not_renotify() {
        let classifier = all_configured();
        let mut record = make_record("A2", "Tornado Warning");
        record.message_type = MessageType::Update;
        record.headline = "still a particularly dangerous situation".to_string();

        assert_eq!(
            classifier.classify(&record, Some(NotificationCategory::PdsTornadoWarning)),
            Classification::Skip(SkipReason::NonEscalatingUpdate)
        );
    }

    #[test]
    fn downgrade_update_never_renotifies() {
        // Escalation monotonicity: once at Emergency, lower severity is final.
        let classifier = all_configured();
        let mut record = make_record("m1", "Tornado Warning");
        record.message_type = MessageType::Update;
        record.headline = "particularly dangerous situation".to_string();

        assert_eq!(
            classifier.classify(&record, Some(NotificationCategory::TornadoEmergency)),
            Classification::Skip(SkipReason::NonEscalatingUpdate)
        );
    }

    #[test]
    fn update_outside_tornado_family_skipped() {
        let classifier = all_configured();
        let mut record = make_record("u1", "Heat Advisory");
        record.message_type = MessageType::Update;
        assert_eq!(
            classifier.classify(&record, Some(NotificationCategory::HeatAdvisory)),
            Classification::Skip(SkipReason::NonEscalatingUpdate)
        );
    }

    #[test]
    fn update_without_history_is_new_notification() {
        let classifier = all_configured();
        let mut record = make_record("n1", "Tornado Warning");
        record.message_type = MessageType::Update;
        let notified = expect_notify(classifier.classify(&record, None));
        assert!(!notified.is_update);
    }

    #[test]
    fn reload_swaps_destination_set() {
        let mut classifier = Classifier::new(true, HashSet::new());
        let record = make_record("r1", "Tornado Watch");
        assert_eq!(
            classifier.classify(&record, None),
            Classification::Skip(SkipReason::NoDestination)
        );

        classifier.reload(true, [NotificationCategory::TornadoWatch].into_iter().collect());
        let notified = expect_notify(classifier.classify(&record, None));
        assert_eq!(notified.category, NotificationCategory::TornadoWatch);
    }
}
