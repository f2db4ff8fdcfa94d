//! Fixed option catalogs and field descriptors.
//!
//! Everything the wizard offers as a button, and the order of the output
//! columns, is defined here and nowhere else.

/// Identity/location fields collected before the project loop, in both
/// conversation order and output-column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Cedula,
    Correo,
    Municipio,
    Parroquia,
    Entidad,
    Nodo,
    Cargo,
}

impl ProfileField {
    /// Column label as it appears on the sheet header.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cedula => "CEDULA",
            Self::Correo => "CORREO",
            Self::Municipio => "MUNICIPIO",
            Self::Parroquia => "PARROQUIA",
            Self::Entidad => "ENTIDAD",
            Self::Nodo => "NODO",
            Self::Cargo => "CARGO",
        }
    }
}

/// Output-column order of the profile fields.
pub const PROFILE_FIELDS: [ProfileField; 7] = [
    ProfileField::Cedula,
    ProfileField::Correo,
    ProfileField::Municipio,
    ProfileField::Parroquia,
    ProfileField::Entidad,
    ProfileField::Nodo,
    ProfileField::Cargo,
];

pub const ENTIDADES: &[&str] = &["ZULIA"];

pub const MUNICIPIOS: &[&str] = &[
    "ALMIRANTE PADILLA",
    "BARALT",
    "CABIMAS",
    "CATATUMBO",
    "COLON",
    "FRANCISCO JAVIER PULGAR",
    "JESUS ENRIQUE LOSSADA",
    "JESUS MARIA SEMPRUN",
    "LA CAÑADA DE URDANETA",
    "LAGUNILLAS",
    "MACHIQUES DE PERIJA",
    "MARA",
    "MARACAIBO",
    "MIRANDA",
    "PAEZ",
    "ROSARIO DE PERIJA",
    "SAN FRANCISCO",
    "SANTA RITA",
    "SIMON BOLIVAR",
    "SUCRE",
    "VALMORES RODRIGUEZ",
];

pub const CARGOS: &[&str] = &[
    "COORDINADOR MUNICIPAL",
    "COORDINADOR NODO",
    "SUPERVISOR DE NODO",
    "VERIFICADOR ENCUESTADOR INTEGRAR",
];

/// The nine project slots, in output-column order. Each selected project
/// contributes four columns to the row; unselected slots stay empty.
pub const PROYECTOS: &[&str] = &[
    "CATASTRO",
    "CENSO POBLACIONAL",
    "ENCUESTA DE HOGARES",
    "VERIFICACION TERRITORIAL",
    "REGISTRO AGRICOLA",
    "SALUD COMUNITARIA",
    "EDUCACION COMUNAL",
    "VIVIENDA",
    "SERVICIOS PUBLICOS",
];

/// One per-project sub-field: sheet label plus the prompt asking for it.
#[derive(Debug, Clone, Copy)]
pub struct ProjectField {
    pub label: &'static str,
    pub prompt: &'static str,
}

/// Per-project sub-fields, asked and written in this order. The fill loop
/// tracks progress as an index into this table, so a legitimately empty
/// answer can never re-trigger a question.
pub const PROJECT_FIELDS: [ProjectField; 4] = [
    ProjectField {
        label: "SEMANA",
        prompt: "Ingrese SEMANA:",
    },
    ProjectField {
        label: "SEGMENTOS",
        prompt: "Ingrese SEGMENTOS TRABAJADOS:",
    },
    ProjectField {
        label: "MANZANAS",
        prompt: "Ingrese MANZANAS TRABAJADAS:",
    },
    ProjectField {
        label: "ENCUESTAS",
        prompt: "Ingrese CANTIDAD DE ENCUESTAS:",
    },
];
