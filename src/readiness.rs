use crate::models::{doc_scope_key, Application, DocState, DocStatusMap, DocTemplate, Essay};

/// How complete one application is, as a 0-100 composite plus the raw counts
/// behind it.
#[derive(Debug, Clone)]
pub struct ReadinessBreakdown {
    pub readiness: i64,
    pub docs_ready: usize,
    pub essay_drafted: usize,
    pub essay_target: i64,
    pub lor_submitted: i64,
    pub lor_target: i64,
}

#[derive(Debug, Clone)]
pub struct ReadinessRow {
    pub application: Application,
    pub readiness: ReadinessBreakdown,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Resolves which application an essay belongs to: the explicit foreign key
/// wins, otherwise the first application whose (school, program) matches the
/// essay's names after trim/lowercase normalization.
pub fn essay_application_id(essay: &Essay, applications: &[Application]) -> Option<i64> {
    if let Some(id) = essay.application_id {
        return Some(id);
    }
    applications
        .iter()
        .find(|application| {
            normalize(&essay.school_name) == normalize(&application.school_name)
                && normalize(&essay.program_type) == normalize(&application.program_name)
        })
        .map(|application| application.id)
}

pub fn essay_count_for_application(
    application: &Application,
    essays: &[Essay],
    applications: &[Application],
) -> usize {
    essays
        .iter()
        .filter(|essay| essay_application_id(essay, applications) == Some(application.id))
        .count()
}

pub fn docs_ready_count(
    application_id: i64,
    doc_status: &DocStatusMap,
    templates: &[DocTemplate],
) -> usize {
    let scope = doc_status.get(&doc_scope_key(Some(application_id)));
    templates
        .iter()
        .filter(|template| {
            scope
                .and_then(|docs| docs.get(template.id))
                .map(|entry| entry.status == DocState::Ready)
                .unwrap_or(false)
        })
        .count()
}

/// Weighted completeness: essays 40%, LORs 25%, documents 25%, interview 10%.
/// A zero requirement counts as fully satisfied rather than dividing by zero.
pub fn application_readiness(
    application: &Application,
    essays: &[Essay],
    applications: &[Application],
    doc_status: &DocStatusMap,
    templates: &[DocTemplate],
) -> ReadinessBreakdown {
    let essay_target = application.essays_required.max(0) as i64;
    let essay_drafted = essay_count_for_application(application, essays, applications);
    let essay_score = if essay_target == 0 {
        1.0
    } else {
        (essay_drafted as f64 / essay_target as f64).min(1.0)
    };

    let lor_target = application.lors_required.max(0) as i64;
    let lor_submitted = application.lors_submitted.max(0) as i64;
    let lor_score = if lor_target == 0 {
        1.0
    } else {
        (lor_submitted as f64 / lor_target as f64).min(1.0)
    };

    let docs_ready = docs_ready_count(application.id, doc_status, templates);
    let doc_score = if templates.is_empty() {
        0.0
    } else {
        docs_ready as f64 / templates.len() as f64
    };

    let interview_score = if !application.interview_required || application.interview_completed {
        1.0
    } else {
        0.0
    };

    let readiness = ((essay_score * 0.4 + lor_score * 0.25 + doc_score * 0.25
        + interview_score * 0.1)
        * 100.0)
        .round() as i64;

    ReadinessBreakdown {
        readiness,
        docs_ready,
        essay_drafted,
        essay_target,
        lor_submitted,
        lor_target,
    }
}

pub fn readiness_rows(
    applications: &[Application],
    essays: &[Essay],
    doc_status: &DocStatusMap,
    templates: &[DocTemplate],
) -> Vec<ReadinessRow> {
    applications
        .iter()
        .map(|application| ReadinessRow {
            application: application.clone(),
            readiness: application_readiness(application, essays, applications, doc_status, templates),
        })
        .collect()
}

pub fn average_readiness(rows: &[ReadinessRow]) -> i64 {
    if rows.is_empty() {
        return 0;
    }
    let total: i64 = rows.iter().map(|row| row.readiness.readiness).sum();
    ((total as f64) / rows.len() as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{application as sample_application, docs_all, essay as sample_essay};
    use crate::models::DOC_TEMPLATES;
    use std::collections::HashMap;

    #[test]
    fn resolver_prefers_foreign_key() {
        let applications = vec![sample_application(1), sample_application(2)];
        let essay = sample_essay(10, Some(2));
        assert_eq!(essay_application_id(&essay, &applications), Some(2));
    }

    #[test]
    fn resolver_falls_back_to_normalized_names() {
        let applications = vec![sample_application(1)];
        let mut essay = sample_essay(10, None);
        essay.school_name = "  harborview ".to_string();
        essay.program_type = "mba".to_string();
        assert_eq!(essay_application_id(&essay, &applications), Some(1));
    }

    #[test]
    fn resolver_returns_none_without_a_match() {
        let applications = vec![sample_application(1)];
        let mut essay = sample_essay(10, None);
        essay.school_name = "Elsewhere".to_string();
        assert_eq!(essay_application_id(&essay, &applications), None);
    }

    #[test]
    fn zero_requirements_score_full_marks() {
        let mut application = sample_application(1);
        application.essays_required = 0;
        application.lors_required = 0;
        application.lors_submitted = 0;
        // 0 of 7 documents ready: 0.4 + 0.25 + 0 + 0.1 = 0.75
        let breakdown =
            application_readiness(&application, &[], &[application.clone()], &HashMap::new(), DOC_TEMPLATES);
        assert_eq!(breakdown.readiness, 75);
    }

    #[test]
    fn fully_complete_application_reaches_100() {
        let mut application = sample_application(1);
        application.essays_required = 1;
        application.lors_required = 1;
        application.lors_submitted = 1;
        let applications = vec![application.clone()];
        let essays = vec![sample_essay(10, Some(1))];
        let docs = docs_all(1, DocState::Ready);

        let breakdown =
            application_readiness(&application, &essays, &applications, &docs, DOC_TEMPLATES);
        assert_eq!(breakdown.readiness, 100);
        assert_eq!(breakdown.docs_ready, DOC_TEMPLATES.len());
    }

    #[test]
    fn oversubmitted_lors_clamp_to_full_credit() {
        let mut application = sample_application(1);
        application.lors_required = 1;
        application.lors_submitted = 4;
        let breakdown =
            application_readiness(&application, &[], &[application.clone()], &HashMap::new(), DOC_TEMPLATES);
        assert!(breakdown.readiness <= 100);
        assert_eq!(breakdown.lor_submitted, 4);
    }

    #[test]
    fn pending_interview_drops_ten_points() {
        let mut complete = sample_application(1);
        complete.essays_required = 0;
        complete.lors_required = 0;
        let mut pending = complete.clone();
        pending.interview_required = true;

        let apps = vec![complete.clone()];
        let with_interview =
            application_readiness(&complete, &[], &apps, &HashMap::new(), DOC_TEMPLATES);
        let without_interview =
            application_readiness(&pending, &[], &apps, &HashMap::new(), DOC_TEMPLATES);
        assert_eq!(with_interview.readiness - without_interview.readiness, 10);
    }

    #[test]
    fn average_rounds_across_rows() {
        let applications = vec![sample_application(1), sample_application(2)];
        let rows = readiness_rows(&applications, &[], &HashMap::new(), DOC_TEMPLATES);
        let expected = (rows.iter().map(|r| r.readiness.readiness).sum::<i64>() as f64
            / rows.len() as f64)
            .round() as i64;
        assert_eq!(average_readiness(&rows), expected);
        assert_eq!(average_readiness(&[]), 0);
    }
}
