use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// The full structured knowledge base: degree requirements plus course catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub degrees: DegreeProgram,
    pub catalog: CourseCatalog,
}

/// Degree requirements for one program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegreeProgram {
    pub program: String,
    pub university: String,
    pub department: String,
    pub total_credits_required: u32,
    pub catalog_year: String,
    pub university_requirements: UniversityRequirements,
    pub college_requirements: CollegeRequirements,
    pub major_requirements: MajorRequirements,
    /// Semester key (e.g. "freshman_fall") to course list, in document order
    #[serde(default, deserialize_with = "ordered_entries")]
    pub four_year_plan_guidance: Vec<(String, Vec<String>)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniversityRequirements {
    pub description: String,
    #[serde(default)]
    pub courses: Vec<RequiredCourse>,
    pub breadth_requirements: BreadthRequirements,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredCourse {
    pub id: String,
    pub name: String,
    pub credits: u32,
    #[serde(default)]
    pub min_grade: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreadthRequirements {
    pub description: String,
    #[serde(default)]
    pub areas: Vec<BreadthArea>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreadthArea {
    pub area: String,
    pub credits: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollegeRequirements {
    pub second_writing_requirement: WritingRequirement,
    pub breadth_requirements: CollegeBreadth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritingRequirement {
    pub description: String,
    #[serde(default)]
    pub approved_courses: Vec<CourseRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollegeBreadth {
    pub description: String,
    #[serde(default)]
    pub groups: Vec<BreadthGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreadthGroup {
    pub group: String,
    pub name: String,
    pub min_credits: u32,
}

/// A course listed either by bare identifier or as an object with an `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourseRef {
    Id(String),
    Detailed {
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl CourseRef {
    pub fn id(&self) -> &str {
        match self {
            CourseRef::Id(id) => id,
            CourseRef::Detailed { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MajorRequirements {
    pub general_notes: String,
    pub first_year_experience: FirstYearExperience,
    #[serde(default)]
    pub core_courses: Vec<NamedCourse>,
    pub mathematics_option: CourseGroup,
    pub restricted_electives: RestrictedElectives,
    pub laboratory_science: LaboratoryScience,
    pub computer_science: CourseGroup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirstYearExperience {
    pub course: String,
    pub name: String,
    pub credits: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedCourse {
    pub id: String,
    pub name: String,
    pub credits: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseGroup {
    pub description: String,
    #[serde(default)]
    pub courses: Vec<NamedCourse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictedElectives {
    pub description: String,
    #[serde(default)]
    pub rules: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaboratoryScience {
    pub description: String,
    #[serde(default)]
    pub sequences: Vec<LabSequence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabSequence {
    pub name: String,
    #[serde(default)]
    pub courses: Vec<CourseRef>,
    pub total_credits: u32,
}

/// The course catalog file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseCatalog {
    pub courses: Vec<CourseDefinition>,
    /// Chain name (e.g. "calculus_sequence") to chain descriptions, in document order
    #[serde(default, deserialize_with = "ordered_entries")]
    pub common_prerequisite_chains: Vec<(String, Vec<String>)>,
    #[serde(default)]
    pub semester_availability_notes: AvailabilityNotes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semester {
    Fall,
    Spring,
}

impl Semester {
    fn all() -> Vec<Semester> {
        vec![Semester::Fall, Semester::Spring]
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semester::Fall => write!(f, "Fall"),
            Semester::Spring => write!(f, "Spring"),
        }
    }
}

fn default_true() -> bool {
    true
}

/// One catalog course. Optional flags carry explicit defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDefinition {
    pub id: String,
    pub name: String,
    pub credits: u32,
    pub level: String,
    pub description: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub corequisites: Vec<String>,
    /// Defaults to both semesters when the catalog has no offering data
    #[serde(default = "Semester::all")]
    pub offered: Vec<Semester>,
    #[serde(default)]
    pub core_for_bs_math: bool,
    #[serde(default)]
    pub math_option: bool,
    #[serde(default)]
    pub honors_section: Option<String>,
    #[serde(default)]
    pub satisfies_second_writing: bool,
    #[serde(default = "default_true")]
    pub restricted_elective_eligible: bool,
}

/// Free-form availability notes: per-course remarks plus honors-section lines
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailabilityNotes {
    pub notes: Vec<(String, String)>,
    pub honors_sections: Vec<String>,
}

impl<'de> Deserialize<'de> for AvailabilityNotes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        use serde_json::Value;

        let entries: Vec<(String, Value)> = ordered_entries(deserializer)?;
        let mut result = AvailabilityNotes::default();

        for (key, value) in entries {
            match value {
                Value::String(note) => result.notes.push((key, note)),
                Value::Array(items) if key == "honors_sections" => {
                    for item in items {
                        match item {
                            Value::String(line) => result.honors_sections.push(line),
                            other => {
                                return Err(D::Error::custom(format!(
                                    "honors_sections entries must be strings, got {}",
                                    other
                                )))
                            }
                        }
                    }
                }
                other => {
                    return Err(D::Error::custom(format!(
                        "availability note '{}' must be a string, got {}",
                        key, other
                    )))
                }
            }
        }

        Ok(result)
    }
}

/// Deserialize a JSON object into its entries, keeping document order
pub(crate) fn ordered_entries<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct EntriesVisitor<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for EntriesVisitor<T>
    where
        T: Deserialize<'de>,
    {
        type Value = Vec<(String, T)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a JSON object")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, T>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}

/// Which structural unit a passage was synthesized from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassageKind {
    Program,
    UniversityRequirement,
    UniversityBreadth,
    CollegeRequirement,
    CollegeBreadth,
    MajorRequirement,
    LabScience,
    FourYearPlan,
    Course,
    PrerequisiteChain,
    AvailabilityNote,
}

impl fmt::Display for PassageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PassageKind::Program => "program",
            PassageKind::UniversityRequirement => "university requirement",
            PassageKind::UniversityBreadth => "university breadth",
            PassageKind::CollegeRequirement => "college requirement",
            PassageKind::CollegeBreadth => "college breadth",
            PassageKind::MajorRequirement => "major requirement",
            PassageKind::LabScience => "lab science",
            PassageKind::FourYearPlan => "four year plan",
            PassageKind::Course => "course",
            PassageKind::PrerequisiteChain => "prerequisite chain",
            PassageKind::AvailabilityNote => "availability note",
        };
        f.write_str(label)
    }
}

/// One self-contained natural-language rendering of a structural unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Stable key derived from the source unit, e.g. `course:MATH302`
    pub id: String,
    pub kind: PassageKind,
    pub text: String,
}

/// A bounded slice of a passage; the unit that is embedded and retrieved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub passage_id: String,
    /// Position of this fragment within its passage
    pub ordinal: usize,
    pub text: String,
}
