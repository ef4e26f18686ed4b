//! Examination report: read-only assembly of a patient's latest records.
//!
//! The report screen shows the newest row of every examination table plus the
//! newest contact lens prescription. `render_report_pdf` produces a printable
//! A4 document from the same data.

use std::fmt::Display;
use std::io::BufWriter;

use chrono::NaiveDateTime;
use printpdf::*;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::*;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Patient not found: {0}")]
    PatientNotFound(i64),

    #[error("Database error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("PDF error: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamReport {
    pub patient: Patient,
    pub medical_history: Option<MedicalHistoryEntry>,
    pub refraction: Option<RefractionExam>,
    pub functional_tests: Option<FunctionalTestEntry>,
    pub anterior_segment: Option<AnteriorSegmentExam>,
    pub fundus: Option<FundusExam>,
    pub group: Option<GroupAssignment>,
    pub contact_lens: Option<ContactLensPrescription>,
    pub generated_at: NaiveDateTime,
}

pub fn build_exam_report(conn: &Connection, patient_id: i64) -> Result<ExamReport, ReportError> {
    let patient = repository::get_patient(conn, patient_id)?
        .ok_or(ReportError::PatientNotFound(patient_id))?;

    Ok(ExamReport {
        medical_history: repository::latest_medical_history_for_patient(conn, patient_id)?,
        refraction: repository::latest_refraction_for_patient(conn, patient_id)?,
        functional_tests: repository::latest_functional_test_for_patient(conn, patient_id)?,
        anterior_segment: repository::latest_anterior_segment_for_patient(conn, patient_id)?,
        fundus: repository::latest_fundus_for_patient(conn, patient_id)?,
        group: repository::latest_group_assignment_for_patient(conn, patient_id)?,
        contact_lens: repository::latest_contact_lens_for_patient(conn, patient_id)?,
        generated_at: chrono::Local::now().naive_local(),
        patient,
    })
}

// ═══════════════════════════════════════════════════════════
// Text layout
// ═══════════════════════════════════════════════════════════

/// One titled block of report lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: &'static str,
    pub lines: Vec<String>,
}

fn field(label: &str, value: Option<impl Display>) -> Option<String> {
    value.map(|v| format!("{label}: {v}"))
}

fn text(label: &str, value: &Option<String>) -> Option<String> {
    field(label, value.as_deref().filter(|v| !v.trim().is_empty()))
}

fn eyes(label: &str, od: Option<impl Display>, os: Option<impl Display>) -> Option<String> {
    match (od, os) {
        (None, None) => None,
        (od, os) => Some(format!(
            "{label}: OD {} / OS {}",
            od.map_or_else(|| "-".to_string(), |v| v.to_string()),
            os.map_or_else(|| "-".to_string(), |v| v.to_string()),
        )),
    }
}

fn eyes_text(label: &str, od: &Option<String>, os: &Option<String>) -> Option<String> {
    eyes(label, od.as_deref(), os.as_deref())
}

fn section(title: &'static str, recorded: Option<NaiveDateTime>, lines: Vec<Option<String>>) -> ReportSection {
    let mut lines: Vec<String> = lines.into_iter().flatten().collect();
    match recorded {
        None => lines = vec!["Not recorded".to_string()],
        Some(at) if lines.is_empty() => {
            lines.push(format!("Recorded {} with no findings", at.format("%Y-%m-%d %H:%M")));
        }
        Some(_) => {}
    }
    ReportSection { title, lines }
}

/// Report content in print order. Absent records read "Not recorded".
pub fn report_sections(report: &ExamReport) -> Vec<ReportSection> {
    let p = &report.patient;
    let mut sections = vec![ReportSection {
        title: "PATIENT",
        lines: [
            Some(format!("{} ({})", p.full_name(), p.patient_code)),
            field("Date of birth", p.date_of_birth),
            Some(format!("Gender: {}", p.gender)),
            text("Phone", &p.phone),
        ]
        .into_iter()
        .flatten()
        .collect(),
    }];

    let mh = report.medical_history.as_ref();
    sections.push(section(
        "MEDICAL HISTORY",
        mh.map(|m| m.created_at),
        mh.map_or_else(Vec::new, |m| {
            vec![
                text("General health", &m.general_health),
                text("Medications", &m.medications),
                text("Allergies", &m.allergies),
                text("Family history", &m.family_history),
                text("Previous eye surgery", &m.previous_eye_surgery),
                text("Ocular history", &m.ocular_history),
                (!m.previous_reports.is_empty())
                    .then(|| format!("Previous reports: {}", m.previous_reports.len())),
                text("Notes", &m.notes),
            ]
        }),
    ));

    let rx = report.refraction.as_ref();
    sections.push(section(
        "REFRACTION",
        rx.map(|r| r.created_at),
        rx.map_or_else(Vec::new, |r| {
            let v = &r.values;
            vec![
                eyes_text("VA uncorrected", &v.va_uncorrected_od, &v.va_uncorrected_os),
                eyes_text("VA corrected", &v.va_corrected_od, &v.va_corrected_os),
                eyes("Auto sphere", v.auto_sphere_od, v.auto_sphere_os),
                eyes("Auto cylinder", v.auto_cylinder_od, v.auto_cylinder_os),
                eyes("Auto axis", v.auto_axis_od, v.auto_axis_os),
                eyes("Sphere", v.subj_sphere_od, v.subj_sphere_os),
                eyes("Cylinder", v.subj_cylinder_od, v.subj_cylinder_os),
                eyes("Axis", v.subj_axis_od, v.subj_axis_os),
                field("Addition", v.addition),
                field("PD (mm)", v.pupillary_distance),
                text("Notes", &v.notes),
            ]
        }),
    ));

    let ft = report.functional_tests.as_ref();
    sections.push(section(
        "FUNCTIONAL TESTS",
        ft.map(|f| f.created_at),
        ft.map_or_else(Vec::new, |f| {
            let v = &f.values;
            vec![
                eyes("IOP (mmHg)", v.iop_od, v.iop_os),
                text("Tonometry", &v.tonometry_method),
                text("Color vision", &v.color_vision),
                text("Stereopsis", &v.stereopsis),
                text("Visual field", &v.visual_field),
                text("Cover test", &v.cover_test),
                text("Notes", &v.notes),
            ]
        }),
    ));

    let ant = report.anterior_segment.as_ref();
    sections.push(section(
        "ANTERIOR SEGMENT",
        ant.map(|a| a.created_at),
        ant.map_or_else(Vec::new, |a| {
            let v = &a.values;
            vec![
                eyes_text("Lids", &v.lids_od, &v.lids_os),
                eyes_text("Conjunctiva", &v.conjunctiva_od, &v.conjunctiva_os),
                eyes_text("Cornea", &v.cornea_od, &v.cornea_os),
                eyes_text("Anterior chamber", &v.anterior_chamber_od, &v.anterior_chamber_os),
                eyes_text("Iris", &v.iris_od, &v.iris_os),
                eyes_text("Lens", &v.lens_od, &v.lens_os),
                text("Notes", &v.notes),
            ]
        }),
    ));

    let fundus = report.fundus.as_ref();
    sections.push(section(
        "FUNDUS",
        fundus.map(|f| f.created_at),
        fundus.map_or_else(Vec::new, |f| {
            let v = &f.values;
            vec![
                eyes_text("Optic disc", &v.optic_disc_od, &v.optic_disc_os),
                eyes("C/D ratio", v.cup_disc_ratio_od, v.cup_disc_ratio_os),
                eyes_text("Macula", &v.macula_od, &v.macula_os),
                eyes_text("Vessels", &v.vessels_od, &v.vessels_os),
                eyes_text("Periphery", &v.periphery_od, &v.periphery_os),
                (!v.images.is_empty()).then(|| format!("Images: {}", v.images.len())),
                text("Notes", &v.notes),
            ]
        }),
    ));

    let group = report.group.as_ref();
    sections.push(section(
        "GROUP",
        group.map(|g| g.created_at),
        group.map_or_else(Vec::new, |g| {
            vec![Some(g.group_name.clone()), text("Notes", &g.notes)]
        }),
    ));

    let cl = report.contact_lens.as_ref();
    sections.push(section(
        "CONTACT LENSES",
        cl.map(|c| c.created_at),
        cl.map_or_else(Vec::new, |c| {
            let v = &c.values;
            vec![
                Some(format!("Type: {}", v.lens_type)),
                text("Brand", &v.brand),
                eyes("Base curve", v.base_curve_od, v.base_curve_os),
                eyes("Diameter", v.diameter_od, v.diameter_os),
                eyes("Sphere", v.sphere_od, v.sphere_os),
                eyes("Cylinder", v.cylinder_od, v.cylinder_os),
                eyes("Axis", v.axis_od, v.axis_os),
                text("Wearing", &v.wearing_schedule),
                text("Replacement", &v.replacement_schedule),
                text("Notes", &v.notes),
            ]
        }),
    ));

    sections
}

// ═══════════════════════════════════════════════════════════
// PDF
// ═══════════════════════════════════════════════════════════

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const TOP: Mm = Mm(280.0);
const BOTTOM: f32 = 20.0;
const WRAP_CHARS: usize = 90;

fn pdf_err(e: impl Display) -> ReportError {
    ReportError::Pdf(e.to_string())
}

/// Renders the report as A4 PDF bytes. Content flows onto new pages as needed.
pub fn render_report_pdf(report: &ExamReport) -> Result<Vec<u8>, ReportError> {
    let title = format!("Examination report: {}", report.patient.patient_code);
    let (doc, page1, layer1) = PdfDocument::new(&title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let mut layer = doc.get_page(page1).get_layer(layer1);
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;

    let mut y = TOP;

    layer.use_text(&title, 14.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    layer.use_text(
        format!("Generated {}", report.generated_at.format("%Y-%m-%d %H:%M")),
        9.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(10.0);

    for s in report_sections(report) {
        ensure_room(&doc, &mut layer, &mut y, 12.0);
        layer.use_text(s.title, 11.0, Mm(20.0), y, &bold);
        y -= Mm(6.0);
        for line in &s.lines {
            for wrapped in wrap_text(line, WRAP_CHARS) {
                ensure_room(&doc, &mut layer, &mut y, 4.5);
                layer.use_text(&wrapped, 9.0, Mm(25.0), y, &font);
                y -= Mm(4.5);
            }
        }
        y -= Mm(4.0);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf).map_err(pdf_err)?;
    buf.into_inner().map_err(pdf_err)
}

/// Starts a new page when fewer than `needed` mm remain above the bottom margin.
fn ensure_room(doc: &PdfDocumentReference, layer: &mut PdfLayerReference, y: &mut Mm, needed: f32) {
    if y.0 - needed < BOTTOM {
        let (page, l) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        *layer = doc.get_page(page).get_layer(l);
        *y = TOP;
    }
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
