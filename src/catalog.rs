//! Static school catalog: teachers, grade levels, subjects and score categories.

pub const TEACHERS: &[&str] = &[
    "Aarón Alvarenga",
    "Adriana Rossell",
    "Alejandra Flores",
    "Alex Sura",
    "Alfredo Castrillo",
    "Armando Rodriguez",
    "Cruz María Hidalgo",
    "Dinora Segundo",
    "Elvis Paredes",
    "Fryda Sales",
    "Gabriel Chicas",
    "Gabriela López",
    "Gustavo Ramírez",
    "Inés Escobar",
    "Iván Lemus",
    "Josué Mejía",
    "Karen Orellana",
    "Luis Aparicio",
    "Max Hernández",
    "Nidia Santana",
    "Patricia de García",
    "Patricia Urrutia",
    "Rebeca Umaña",
    "Ricardo Hernández",
    "Roberto Flores",
    "Sonia Flores",
    "Verónica Martínez",
    "Victoria Corado",
    "Yandy de Carranza",
];

pub const GRADES: &[&str] = &[
    "1st Grade",
    "2nd Grade",
    "3rd Grade",
    "4th Grade",
    "5th Grade",
    "6th Grade",
    "7th Grade",
    "8th Grade",
    "9th Grade",
    "10th Grade",
    "11th Grade",
    "12th Grade",
];

const ELEMENTARY: &[&str] = &[
    "Math",
    "Language Arts",
    "Science",
    "Music",
    "Arte",
    "Deportes",
    "Reading",
];

pub const SUBJECTS_BY_GRADE: &[(&str, &[&str])] = &[
    ("1st Grade", ELEMENTARY),
    ("2nd Grade", ELEMENTARY),
    ("3rd Grade", ELEMENTARY),
    ("4th Grade", ELEMENTARY),
    ("5th Grade", ELEMENTARY),
    ("6th Grade", ELEMENTARY),
    (
        "7th Grade",
        &[
            "Math",
            "Language Arts",
            "Science",
            "History",
            "Geography",
            "Music",
            "Arte",
            "Deportes",
            "Physics",
        ],
    ),
    (
        "8th Grade",
        &[
            "Math",
            "Language Arts",
            "Science",
            "History",
            "Geography",
            "Music",
            "Arte",
            "Deportes",
            "Physics",
            "Chemistry",
        ],
    ),
    (
        "9th Grade",
        &[
            "Algebra and Geometry I",
            "Biology",
            "History",
            "Language Arts",
            "Français",
            "IT",
            "Deportes",
            "Ciudadanía y Valores",
        ],
    ),
    (
        "10th Grade",
        &[
            "Algebra and Geometry II",
            "Chemistry",
            "History",
            "Language Arts",
            "Français",
            "IT",
            "Deportes",
            "Ciudadanía y Valores",
        ],
    ),
    (
        "11th Grade",
        &[
            "AP Precalculus I",
            "Physics",
            "AP History",
            "AP English Language",
            "AP Spanish",
            "Economics",
            "Careers",
        ],
    ),
    (
        "12th Grade",
        &[
            "AP Precalculus II",
            "AP Environmental Science",
            "College Writing",
            "AP Economics",
            "TOEFL",
            "Habilidades para la Vida",
        ],
    ),
];

pub const CATEGORIES: &[&str] = &[
    "Actividad 1",
    "Actividad 2",
    "Actividad 3",
    "Examen de Período",
    "Actividad Integradora",
    "Proyecto de Trimestre",
    "Puntos Extra (Participación)",
    "Puntos Extra (Actitudinal)",
    "Tareas",
];

/// A score column of the report grid. `category` is matched exactly against
/// `GradeRecord::category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportColumn {
    pub header: &'static str,
    pub category: &'static str,
}

pub const REPORT_COLUMNS: [ReportColumn; 5] = [
    ReportColumn {
        header: "Actividad 1",
        category: "Actividad 1",
    },
    ReportColumn {
        header: "Actividad 2",
        category: "Actividad 2",
    },
    ReportColumn {
        header: "Actividad 3",
        category: "Actividad 3",
    },
    ReportColumn {
        header: "Actividad Integradora",
        category: "Actividad Integradora",
    },
    ReportColumn {
        header: "Examen",
        category: "Examen de Período",
    },
];

/// Default grade for the roster forms.
pub fn first_grade() -> &'static str {
    GRADES[0]
}

pub fn subjects_for_grade(grade: &str) -> &'static [&'static str] {
    SUBJECTS_BY_GRADE
        .iter()
        .find(|(g, _)| *g == grade)
        .map(|(_, subjects)| *subjects)
        .unwrap_or(&[])
}

/// Every subject taught in any grade, deduplicated and sorted. This is the
/// list offered in grade entry once a teacher is chosen.
pub fn all_unique_subjects() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = SUBJECTS_BY_GRADE
        .iter()
        .flat_map(|(_, subjects)| subjects.iter().copied())
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}
