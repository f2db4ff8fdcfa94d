//! Output-row construction for the tabular store.

use chrono::{DateTime, Utc};

use crate::wizard::catalog::{PROFILE_FIELDS, PROJECT_FIELDS, PROYECTOS};
use crate::wizard::session::Session;

/// Fixed row width: submission stamps, profile fields, then four cells per
/// catalog project slot whether selected or not.
pub const ROW_WIDTH: usize = 2 + PROFILE_FIELDS.len() + PROYECTOS.len() * PROJECT_FIELDS.len();

/// Build the flat row for one confirmed submission.
///
/// Project cells follow the fixed catalog order, independent of the order
/// the user selected projects in. Unselected or unfilled slots contribute
/// empty cells so the row width never varies.
pub fn build_row(session: &Session, at: DateTime<Utc>) -> Vec<String> {
    let mut row = Vec::with_capacity(ROW_WIDTH);
    row.push(at.format("%Y-%m-%d %H:%M:%S").to_string());
    row.push(at.format("%d/%m/%Y").to_string());

    for field in PROFILE_FIELDS {
        row.push(session.answer(field).to_string());
    }

    for project in PROYECTOS {
        let selected = session.selected_projects.iter().any(|p| p == project);
        let values = session.project_data.get(*project);
        for i in 0..PROJECT_FIELDS.len() {
            let cell = if selected {
                values.and_then(|v| v.get(i)).cloned().unwrap_or_default()
            } else {
                String::new()
            };
            row.push(cell);
        }
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::catalog::ProfileField;
    use chrono::TimeZone;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 9, 5, 30).unwrap()
    }

    fn session_with(projects: &[(&str, [&str; 4])]) -> Session {
        let mut session = Session::new();
        session.answers.insert(ProfileField::Cedula, "V123".into());
        session.answers.insert(ProfileField::Correo, "a@b.com".into());
        session.answers.insert(ProfileField::Municipio, "CABIMAS".into());
        session.answers.insert(ProfileField::Parroquia, "Centro".into());
        session.answers.insert(ProfileField::Entidad, "ZULIA".into());
        session.answers.insert(ProfileField::Nodo, "N1".into());
        session.answers.insert(ProfileField::Cargo, "COORDINADOR NODO".into());
        for (name, values) in projects {
            session.selected_projects.push((*name).to_string());
            session
                .project_data
                .insert((*name).to_string(), values.iter().map(|v| (*v).to_string()).collect());
        }
        session
    }

    #[test]
    fn row_width_is_45() {
        assert_eq!(ROW_WIDTH, 45);
        let row = build_row(&session_with(&[]), stamp());
        assert_eq!(row.len(), ROW_WIDTH);
    }

    #[test]
    fn stamps_use_submission_instant() {
        let row = build_row(&session_with(&[]), stamp());
        assert_eq!(row[0], "2024-07-01 09:05:30");
        assert_eq!(row[1], "01/07/2024");
    }

    #[test]
    fn profile_cells_in_column_order() {
        let row = build_row(&session_with(&[]), stamp());
        assert_eq!(
            &row[2..9],
            ["V123", "a@b.com", "CABIMAS", "Centro", "ZULIA", "N1", "COORDINADOR NODO"]
        );
    }

    #[test]
    fn unselected_projects_pad_with_empty_cells() {
        let row = build_row(&session_with(&[("CATASTRO", ["1", "2", "3", "4"])]), stamp());
        assert_eq!(&row[9..13], ["1", "2", "3", "4"]);
        assert!(row[13..].iter().all(String::is_empty));
    }

    #[test]
    fn project_cells_follow_catalog_order_not_selection_order() {
        // VIVIENDA (slot 8) selected before CATASTRO (slot 1).
        let row = build_row(
            &session_with(&[("VIVIENDA", ["5", "6", "7", "8"]), ("CATASTRO", ["1", "2", "3", "4"])]),
            stamp(),
        );
        assert_eq!(&row[9..13], ["1", "2", "3", "4"]);
        // VIVIENDA occupies the eighth project slot: 9 + 7*4 = 37.
        assert_eq!(&row[37..41], ["5", "6", "7", "8"]);
    }

    #[test]
    fn partially_filled_project_pads_to_four_cells() {
        let mut session = session_with(&[]);
        session.selected_projects.push("CATASTRO".to_string());
        session
            .project_data
            .insert("CATASTRO".to_string(), vec!["1".to_string(), "2".to_string()]);
        let row = build_row(&session, stamp());
        assert_eq!(row.len(), ROW_WIDTH);
        assert_eq!(&row[9..13], ["1", "2", "", ""]);
    }
}
