use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use super::request::StudyRequest;
use crate::config::Organisations;
use crate::design::{DesignDecision, DesignRationale, VariabilityClass};
use crate::stats::SampleSizeResult;

const PK_PARAMETERS: &str = "Cmax, AUC0-t, Tmax, T½";
const BE_CRITERIA: &str =
    "90% CI for the ratio of geometric means of Cmax and AUC0-t within 80.00–125.00%";
const NOT_REPORTED: &str = "not reported";

/// Values the synopsis is rendered from.
#[derive(Debug, Clone)]
pub struct SynopsisInputs<'a> {
    pub request: &'a StudyRequest,
    pub organisations: &'a Organisations,
    pub cv_intra: f64,
    pub t_half: f64,
    pub cmax_range: Option<&'a str>,
    pub auc_range: Option<&'a str>,
    pub sample_size: &'a SampleSizeResult,
    pub decision: &'a DesignDecision,
    pub generated_at: NaiveDateTime,
}

/// `BE-<first three letters of the INN>-<YYYYMM>`.
pub fn protocol_id(inn: &str, generated_at: &NaiveDateTime) -> String {
    let prefix: String = inn.chars().take(3).collect::<String>().to_uppercase();
    format!("BE-{}-{}", prefix, generated_at.format("%Y%m"))
}

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

fn day_count(days: u32) -> String {
    match days {
        1 => "1 day".to_string(),
        n => format!("{} days", n),
    }
}

fn period_word(periods: u32) -> &'static str {
    match periods {
        2 => "two",
        4 => "four",
        _ => "multi",
    }
}

/// Fixed explanatory sentence for the variability class.
pub fn rationale_text(inn: &str, rationale: &DesignRationale, power: f64, dropout: f64) -> String {
    match rationale.class {
        VariabilityClass::HighlyVariable => format!(
            "{} is a highly variable drug (CV={:.2}). In line with EAEU Decision No. 85 a replicate \
             design with reference-scaled bioequivalence limits (RSABE) is recommended. A sample \
             size of {} provides {} power with an expected dropout of {}.",
            inn,
            rationale.cv_intra,
            rationale.total_count,
            percent(power),
            percent(dropout)
        ),
        VariabilityClass::Moderate => format!(
            "For {} with moderate variability (CV={:.2}) a standard 2x2 crossover design is \
             sufficient. The washout period is derived from T½. A sample size of {} meets the \
             requirements of EAEU Decision No. 85.",
            inn, rationale.cv_intra, rationale.total_count
        ),
    }
}

/// Placeholder key → rendered value for every synopsis field.
pub fn build_fields(inputs: &SynopsisInputs<'_>) -> BTreeMap<String, String> {
    let request = inputs.request;
    let inn = request.inn.as_str();
    let decision = inputs.decision;
    let sample = inputs.sample_size;
    let dropout = request.dropout();

    let mut fields = BTreeMap::new();
    let mut put = |key: &str, value: String| {
        fields.insert(key.to_string(), value);
    };

    put("protocol_title", format!("Bioequivalence study of {} products", inn));
    put("protocol_id", protocol_id(inn, &inputs.generated_at));
    put(
        "protocol_version",
        format!("Version 1.0 of {}", inputs.generated_at.format("%d.%m.%Y")),
    );
    put("sponsor", inputs.organisations.sponsor.clone());
    put("research_center", inputs.organisations.research_center.clone());
    put("bioanalytical_lab", inputs.organisations.laboratory.clone());
    put("insurer", inputs.organisations.insurer.clone());

    put(
        "product_name",
        format!("Test {} {} {}", inn, request.dosage_form, request.dosage_strength),
    );
    put("active_substance", inn.to_string());
    put("test_product", format!("{} {}", inn, request.dosage_strength));
    put("reference_product", format!("{} originator", inn));
    put("intake_mode", request.intake_mode.to_string());
    put("analyte", inn.to_string());

    put(
        "objective",
        format!(
            "Assessment of bioequivalence of {} products under {} conditions",
            inn, request.intake_mode
        ),
    );
    put("design", decision.design.to_string());
    put(
        "methodology",
        format!(
            "Open-label, randomised, {}-period crossover study with a washout period of {}",
            period_word(decision.design.periods()),
            day_count(decision.washout_days)
        ),
    );
    put(
        "study_duration",
        format!("up to {}", day_count(decision.study_duration_days)),
    );
    put(
        "volunteers",
        format!(
            "{} volunteers enrolled (allowing for {} dropout)",
            sample.total_count,
            percent(dropout)
        ),
    );
    put("volunteers_per_group", decision.per_arm_count.to_string());

    put("cv_intra", format!("{:.2}", inputs.cv_intra));
    put("half_life", format!("{} h", inputs.t_half));
    put("cmax_range", inputs.cmax_range.unwrap_or(NOT_REPORTED).to_string());
    put("auc_range", inputs.auc_range.unwrap_or(NOT_REPORTED).to_string());
    put("pk_parameters", PK_PARAMETERS.to_string());
    put("be_criteria", BE_CRITERIA.to_string());
    put(
        "sample_size_justification",
        format!(
            "Based on CVintra = {:.2}: N={}; allowing for {} dropout, {} in total.",
            inputs.cv_intra,
            sample.per_sequence_count,
            percent(dropout),
            sample.total_count
        ),
    );
    put(
        "design_rationale",
        rationale_text(inn, &decision.rationale, request.sample_size.power, dropout),
    );

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_count_pluralises() {
        assert_eq!(day_count(1), "1 day");
        assert_eq!(day_count(2), "2 days");
        assert_eq!(day_count(36), "36 days");
    }
    use crate::design::StudyDesign;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_protocol_id() {
        assert_eq!(protocol_id("Ibuprofen", &at()), "BE-IBU-202603");
        assert_eq!(protocol_id("Xa", &at()), "BE-XA-202603");
    }

    #[test]
    fn test_rationale_text_by_class() {
        let high = DesignRationale {
            class: VariabilityClass::HighlyVariable,
            cv_intra: 0.351,
            total_count: 47,
        };
        let text = rationale_text("Atorvastatin", &high, 0.8, 0.2);
        assert!(text.contains("CV=0.35"));
        assert!(text.contains("RSABE"));
        assert!(text.contains("80% power"));
        assert!(text.contains("20%"));

        let moderate = DesignRationale {
            class: VariabilityClass::Moderate,
            cv_intra: 0.2,
            total_count: 17,
        };
        let text = rationale_text("Metformin", &moderate, 0.8, 0.2);
        assert!(text.contains("2x2 crossover"));
        assert!(text.contains("sample size of 17"));
    }

    #[test]
    fn test_build_fields() {
        let request = StudyRequest::new("Ibuprofen");
        let organisations = Organisations::default();
        let sample = SampleSizeResult {
            per_sequence_count: 20,
            total_count: 25,
        };
        let decision = DesignDecision {
            design: StudyDesign::StandardCrossover,
            washout_days: 1,
            study_duration_days: 16,
            per_arm_count: 12,
            rationale: DesignRationale {
                class: VariabilityClass::Moderate,
                cv_intra: 0.25,
                total_count: 25,
            },
        };
        let fields = build_fields(&SynopsisInputs {
            request: &request,
            organisations: &organisations,
            cv_intra: 0.25,
            t_half: 2.0,
            cmax_range: Some("15-25 µg/mL"),
            auc_range: None,
            sample_size: &sample,
            decision: &decision,
            generated_at: at(),
        });

        assert_eq!(fields["design"], "2x2 crossover");
        assert_eq!(fields["study_duration"], "up to 16 days");
        assert_eq!(fields["volunteers_per_group"], "12");
        assert_eq!(fields["cv_intra"], "0.25");
        assert_eq!(fields["half_life"], "2 h");
        assert_eq!(fields["auc_range"], "not reported");
        assert_eq!(
            fields["sample_size_justification"],
            "Based on CVintra = 0.25: N=20; allowing for 20% dropout, 25 in total."
        );
        assert!(fields["methodology"].contains("two-period"));
        assert!(fields["methodology"].ends_with("washout period of 1 day"));
        assert_eq!(fields["protocol_version"], "Version 1.0 of 05.03.2026");
    }
}
