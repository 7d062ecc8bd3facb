//! Resume and source effectiveness — which resume snapshot and which job
//! board actually produce responses and interviews.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::analytics::round2;
use crate::models::application::ApplicationRow;
use crate::models::job::{JobRow, ResumeRow};
use crate::models::stage::{StageEntryRow, StageTemplateRow};

/// Label applications land under when their job has no usable source.
pub const UNKNOWN_SOURCE: &str = "Unknown";

#[derive(Debug, Serialize)]
pub struct ResumeEffectivenessRow {
    pub resume_id: Uuid,
    pub title: String,
    pub applications_count: usize,
    pub responses_count: usize,
    pub interviews_count: usize,
    pub response_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct SourceEffectivenessRow {
    pub source: String,
    pub applications_count: usize,
    pub responses_count: usize,
    pub interviews_count: usize,
    pub response_rate: f64,
}

/// Per-application outcome flags shared by both effectiveness reports.
/// A response is any entry past the first stage; an interview is any entry
/// whose template name contains "interview" (case-insensitive substring;
/// the stage catalog has no structured type field).
struct Outcomes {
    responded: HashSet<Uuid>,
    interviewed: HashSet<Uuid>,
}

fn collect_outcomes(entries: &[StageEntryRow], templates: &[StageTemplateRow]) -> Outcomes {
    let interview_templates: HashSet<Uuid> = templates
        .iter()
        .filter(|t| t.name.to_lowercase().contains("interview"))
        .map(|t| t.id)
        .collect();

    let mut responded = HashSet::new();
    let mut interviewed = HashSet::new();
    for entry in entries {
        if entry.sort_order > 1 {
            responded.insert(entry.application_id);
        }
        if interview_templates.contains(&entry.template_id) {
            interviewed.insert(entry.application_id);
        }
    }
    Outcomes {
        responded,
        interviewed,
    }
}

fn rate(responses: usize, applications: usize) -> f64 {
    if applications == 0 {
        0.0
    } else {
        round2(responses as f64 / applications as f64 * 100.0)
    }
}

/// One row per resume, including resumes no application uses yet.
/// Ordered by `applications_count` descending, then title ascending.
pub fn build_resume_effectiveness(
    resumes: &[ResumeRow],
    apps: &[ApplicationRow],
    entries: &[StageEntryRow],
    templates: &[StageTemplateRow],
) -> Vec<ResumeEffectivenessRow> {
    let outcomes = collect_outcomes(entries, templates);

    let mut rows: Vec<ResumeEffectivenessRow> = resumes
        .iter()
        .map(|resume| {
            let used_by: Vec<&ApplicationRow> = apps
                .iter()
                .filter(|a| a.resume_id == Some(resume.id))
                .collect();
            let responses = used_by
                .iter()
                .filter(|a| outcomes.responded.contains(&a.id))
                .count();
            let interviews = used_by
                .iter()
                .filter(|a| outcomes.interviewed.contains(&a.id))
                .count();
            ResumeEffectivenessRow {
                resume_id: resume.id,
                title: resume.title.clone(),
                applications_count: used_by.len(),
                responses_count: responses,
                interviews_count: interviews,
                response_rate: rate(responses, used_by.len()),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.applications_count
            .cmp(&a.applications_count)
            .then_with(|| a.title.cmp(&b.title))
    });
    rows
}

/// One row per job source among the user's applications; jobs with a null
/// or empty source merge under [`UNKNOWN_SOURCE`]. Ordered by
/// `applications_count` descending, then source ascending.
pub fn build_source_effectiveness(
    jobs: &[JobRow],
    apps: &[ApplicationRow],
    entries: &[StageEntryRow],
    templates: &[StageTemplateRow],
) -> Vec<SourceEffectivenessRow> {
    let outcomes = collect_outcomes(entries, templates);

    let source_of: HashMap<Uuid, String> = jobs
        .iter()
        .map(|job| {
            let label = match job.source.as_deref() {
                Some(s) if !s.trim().is_empty() => s.to_string(),
                _ => UNKNOWN_SOURCE.to_string(),
            };
            (job.id, label)
        })
        .collect();

    let mut grouped: HashMap<String, (usize, usize, usize)> = HashMap::new();
    for app in apps {
        let label = source_of
            .get(&app.job_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
        let counters = grouped.entry(label).or_default();
        counters.0 += 1;
        if outcomes.responded.contains(&app.id) {
            counters.1 += 1;
        }
        if outcomes.interviewed.contains(&app.id) {
            counters.2 += 1;
        }
    }

    let mut rows: Vec<SourceEffectivenessRow> = grouped
        .into_iter()
        .map(
            |(source, (applications, responses, interviews))| SourceEffectivenessRow {
                source,
                applications_count: applications,
                responses_count: responses,
                interviews_count: interviews,
                response_rate: rate(responses, applications),
            },
        )
        .collect();

    rows.sort_by(|a, b| {
        b.applications_count
            .cmp(&a.applications_count)
            .then_with(|| a.source.cmp(&b.source))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus;
    use crate::models::stage::StageStatus;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, 0, 0, 0).unwrap()
    }

    fn template(name: &str, order: i32) -> StageTemplateRow {
        StageTemplateRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            sort_order: order,
            created_at: at(1),
        }
    }

    fn resume(title: &str) -> ResumeRow {
        ResumeRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            created_at: at(1),
        }
    }

    fn job(source: Option<&str>) -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            source: source.map(str::to_string),
            url: None,
            created_at: at(1),
        }
    }

    fn app(job_id: Uuid, resume_id: Option<Uuid>) -> ApplicationRow {
        ApplicationRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            job_id,
            resume_id,
            name: "app".to_string(),
            status: ApplicationStatus::Active,
            applied_at: at(1),
            created_at: at(1),
            updated_at: at(1),
        }
    }

    fn entry(app_id: Uuid, template: &StageTemplateRow) -> StageEntryRow {
        StageEntryRow {
            id: Uuid::new_v4(),
            application_id: app_id,
            template_id: template.id,
            status: StageStatus::Active,
            sort_order: template.sort_order,
            started_at: at(2),
            completed_at: None,
            created_at: at(2),
        }
    }

    #[test]
    fn test_resume_with_one_responder_in_four() {
        let r = resume("General CV");
        let j = job(Some("LinkedIn"));
        let phone = template("Phone Screen", 2);
        let apps: Vec<ApplicationRow> = (0..4).map(|_| app(j.id, Some(r.id))).collect();
        let entries = vec![entry(apps[0].id, &phone)];
        let rows = build_resume_effectiveness(&[r], &apps, &entries, &[phone]);

        assert_eq!(rows[0].applications_count, 4);
        assert_eq!(rows[0].responses_count, 1);
        assert_eq!(rows[0].response_rate, 25.0);
    }

    #[test]
    fn test_interview_detection_is_case_insensitive_substring() {
        let r = resume("General CV");
        let j = job(None);
        let onsite = template("Final INTERVIEW round", 3);
        let a = app(j.id, Some(r.id));
        let entries = vec![entry(a.id, &onsite)];
        let rows = build_resume_effectiveness(&[r], &[a], &entries, &[onsite]);
        assert_eq!(rows[0].interviews_count, 1);
    }

    #[test]
    fn test_unused_resume_reports_zeros() {
        let used = resume("Alpha");
        let unused = resume("Zeta");
        let j = job(None);
        let a = app(j.id, Some(used.id));
        let rows = build_resume_effectiveness(&[used, unused], &[a], &[], &[]);
        assert_eq!(rows[0].title, "Alpha");
        assert_eq!(rows[1].title, "Zeta");
        assert_eq!(rows[1].applications_count, 0);
        assert_eq!(rows[1].response_rate, 0.0);
    }

    #[test]
    fn test_empty_and_null_sources_merge_under_unknown() {
        let empty = job(Some(""));
        let null = job(None);
        let apps = vec![app(empty.id, None), app(null.id, None)];
        let rows = build_source_effectiveness(&[empty, null], &apps, &[], &[]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, UNKNOWN_SOURCE);
        assert_eq!(rows[0].applications_count, 2);
    }

    #[test]
    fn test_sources_order_by_count_then_name() {
        let board_a = job(Some("AngelList"));
        let board_b = job(Some("LinkedIn"));
        let referral = job(Some("Referral"));
        let apps = vec![
            app(board_a.id, None),
            app(board_b.id, None),
            app(referral.id, None),
            app(referral.id, None),
        ];
        let rows =
            build_source_effectiveness(&[board_a, board_b, referral], &apps, &[], &[]);
        let order: Vec<&str> = rows.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(order, vec!["Referral", "AngelList", "LinkedIn"]);
    }
}
