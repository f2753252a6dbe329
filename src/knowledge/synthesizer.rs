use sha2::{Digest, Sha256};

use crate::error::KnowledgeBaseError;
use crate::knowledge::types::{
    CourseDefinition, DegreeProgram, KnowledgeBase, NamedCourse, Passage, PassageKind,
};

/// Render the structured knowledge base as an ordered list of self-contained passages.
///
/// Pure: the same knowledge base always yields byte-identical passages in the same
/// order. Every passage names its program or course so it can be read alone.
pub fn synthesize(kb: &KnowledgeBase) -> Result<Vec<Passage>, KnowledgeBaseError> {
    let mut synthesizer = Synthesizer::new(&kb.degrees)?;

    synthesizer.program(&kb.degrees);
    synthesizer.university_requirements(&kb.degrees)?;
    synthesizer.college_requirements(&kb.degrees)?;
    synthesizer.major_requirements(&kb.degrees)?;
    synthesizer.four_year_plan(&kb.degrees);
    synthesizer.courses(&kb.catalog.courses)?;

    for (name, chain) in &kb.catalog.common_prerequisite_chains {
        let steps: Vec<&str> = chain.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
        if steps.is_empty() {
            continue;
        }
        synthesizer.push(
            format!("chain:{}", name),
            PassageKind::PrerequisiteChain,
            format!(
                "Common Prerequisite Chain for the {}, {}: {}.",
                synthesizer.context,
                humanize_key(name),
                steps.join(", ")
            ),
        );
    }

    let notes = &kb.catalog.semester_availability_notes;
    for (course, note) in &notes.notes {
        if note.trim().is_empty() {
            continue;
        }
        synthesizer.push(
            format!("availability:{}", course),
            PassageKind::AvailabilityNote,
            format!(
                "Semester Availability Note for {}: {}",
                course,
                terminated(note)
            ),
        );
    }
    let honors: Vec<&str> = notes
        .honors_sections
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !honors.is_empty() {
        synthesizer.push(
            "availability:honors".to_string(),
            PassageKind::AvailabilityNote,
            format!(
                "Honors Sections for the {}: {}.",
                synthesizer.context,
                honors.join("; ")
            ),
        );
    }

    Ok(synthesizer.passages)
}

/// SHA-256 over passage ids and texts, used to tell knowledge-base revisions apart
pub fn fingerprint(passages: &[Passage]) -> String {
    let mut hasher = Sha256::new();
    for passage in passages {
        hasher.update(passage.id.as_bytes());
        hasher.update([0u8]);
        hasher.update(passage.text.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

struct Synthesizer {
    /// "BS in Mathematics at University of Delaware"
    context: String,
    program: String,
    passages: Vec<Passage>,
}

impl Synthesizer {
    fn new(degrees: &DegreeProgram) -> Result<Self, KnowledgeBaseError> {
        let program = required(&degrees.program, "degree program", "program")?;
        let university = required(&degrees.university, "degree program", "university")?;

        Ok(Self {
            context: format!("{} at {}", program, university),
            program: program.to_string(),
            passages: Vec::new(),
        })
    }

    fn push(&mut self, id: String, kind: PassageKind, text: String) {
        self.passages.push(Passage { id, kind, text });
    }

    fn program(&mut self, degrees: &DegreeProgram) {
        let mut text = format!("Program: {}.", self.context);
        if !degrees.department.trim().is_empty() {
            text.push_str(&format!(" Department: {}.", degrees.department.trim()));
        }
        text.push_str(&format!(
            " Total credits required: {}.",
            degrees.total_credits_required
        ));
        if !degrees.catalog_year.trim().is_empty() {
            text.push_str(&format!(" Catalog year: {}.", degrees.catalog_year.trim()));
        }
        self.push("program".to_string(), PassageKind::Program, text);
    }

    fn university_requirements(&mut self, degrees: &DegreeProgram) -> Result<(), KnowledgeBaseError> {
        let requirements = &degrees.university_requirements;

        let text = headed(
            format!("University Requirements for the {}", self.context),
            &requirements.description,
        );
        self.push(
            "university:summary".to_string(),
            PassageKind::UniversityRequirement,
            text,
        );

        for (position, course) in requirements.courses.iter().enumerate() {
            let unit = format!("university requirement #{}", position + 1);
            let id = required(&course.id, &unit, "id")?;
            let name = required(&course.name, &unit, "name")?;

            let mut text = format!(
                "University Requirement for the {}: {} ({}). Credits: {}.",
                self.context, id, name, course.credits
            );
            if let Some(grade) = non_blank(course.min_grade.as_deref()) {
                text.push_str(&format!(" Minimum grade for {}: {}.", id, grade));
            }
            if let Some(notes) = non_blank(course.notes.as_deref()) {
                text.push_str(&format!(" Notes: {}", terminated(notes)));
            }
            self.push(
                format!("university:course:{}", id),
                PassageKind::UniversityRequirement,
                text,
            );
        }

        let breadth = &requirements.breadth_requirements;
        let text = headed(
            format!("University Breadth Requirements for the {}", self.context),
            &breadth.description,
        );
        self.push(
            "university:breadth".to_string(),
            PassageKind::UniversityBreadth,
            text,
        );

        for (position, area) in breadth.areas.iter().enumerate() {
            let unit = format!("university breadth area #{}", position + 1);
            let name = required(&area.area, &unit, "area")?;

            let mut text = format!(
                "University Breadth Area for the {}: {}, {} required.",
                self.context,
                name,
                credits_label(area.credits)
            );
            if let Some(notes) = non_blank(area.notes.as_deref()) {
                text.push(' ');
                text.push_str(&terminated(notes));
            }
            self.push(
                format!("university:breadth:{}", name),
                PassageKind::UniversityBreadth,
                text,
            );
        }

        Ok(())
    }

    fn college_requirements(&mut self, degrees: &DegreeProgram) -> Result<(), KnowledgeBaseError> {
        let college = &degrees.college_requirements;

        let writing = &college.second_writing_requirement;
        let mut text = headed(
            format!("College Second Writing Requirement for the {}", self.context),
            &writing.description,
        );
        let approved: Vec<&str> = writing
            .approved_courses
            .iter()
            .map(|c| c.id().trim())
            .filter(|id| !id.is_empty())
            .collect();
        if !approved.is_empty() {
            text.push_str(&format!(" Approved courses: {}.", approved.join(", ")));
        }
        self.push(
            "college:writing".to_string(),
            PassageKind::CollegeRequirement,
            text,
        );

        let breadth = &college.breadth_requirements;
        let text = headed(
            format!("College Breadth Requirements for the {}", self.context),
            &breadth.description,
        );
        self.push(
            "college:breadth".to_string(),
            PassageKind::CollegeBreadth,
            text,
        );

        for (position, group) in breadth.groups.iter().enumerate() {
            let unit = format!("college breadth group #{}", position + 1);
            let label = required(&group.group, &unit, "group")?;
            let name = required(&group.name, &unit, "name")?;

            self.push(
                format!("college:breadth:{}", label),
                PassageKind::CollegeBreadth,
                format!(
                    "College Breadth Group {} for the {}: {}, minimum {}.",
                    label,
                    self.context,
                    name,
                    credits_label(group.min_credits)
                ),
            );
        }

        Ok(())
    }

    fn major_requirements(&mut self, degrees: &DegreeProgram) -> Result<(), KnowledgeBaseError> {
        let major = &degrees.major_requirements;

        if !major.general_notes.trim().is_empty() {
            let text = format!(
                "Major General Notes for the {}: {}",
                self.context,
                terminated(&major.general_notes)
            );
            self.push(
                "major:notes".to_string(),
                PassageKind::MajorRequirement,
                text,
            );
        }

        let fye = &major.first_year_experience;
        let course = required(&fye.course, "first year experience", "course")?;
        self.push(
            "major:first_year".to_string(),
            PassageKind::MajorRequirement,
            format!(
                "First Year Experience for the {}: {}, {}.",
                self.context,
                course_label(course, &fye.name),
                credits_label(fye.credits)
            ),
        );

        if !major.core_courses.is_empty() {
            let listing = course_listing(&major.core_courses, "major core courses")?;
            self.push(
                "major:core".to_string(),
                PassageKind::MajorRequirement,
                format!(
                    "Major Core Courses for the {} (all required): {}.",
                    self.context, listing
                ),
            );
        }

        let option = &major.mathematics_option;
        let mut text = headed(
            format!("Mathematics Option for the {}", self.context),
            &option.description,
        );
        if !option.courses.is_empty() {
            let listing = course_listing(&option.courses, "mathematics option")?;
            text.push_str(&format!(" Choices: {}.", listing));
        }
        self.push(
            "major:math_option".to_string(),
            PassageKind::MajorRequirement,
            text,
        );

        let electives = &major.restricted_electives;
        let mut text = headed(
            format!("Restricted Electives for the {}", self.context),
            &electives.description,
        );
        let rules: Vec<String> = electives
            .rules
            .iter()
            .filter(|rule| !rule.trim().is_empty())
            .map(|rule| terminated(rule))
            .collect();
        if !rules.is_empty() {
            text.push_str(&format!(" Rules: {}", rules.join(" ")));
        }
        self.push(
            "major:restricted_electives".to_string(),
            PassageKind::MajorRequirement,
            text,
        );

        let lab = &major.laboratory_science;
        let text = headed(
            format!("Laboratory Science Requirement for the {}", self.context),
            &lab.description,
        );
        self.push(
            "major:lab_science".to_string(),
            PassageKind::LabScience,
            text,
        );
        for (position, sequence) in lab.sequences.iter().enumerate() {
            let unit = format!("laboratory science sequence #{}", position + 1);
            let name = required(&sequence.name, &unit, "name")?;
            let courses: Vec<&str> = sequence
                .courses
                .iter()
                .map(|c| c.id().trim())
                .filter(|id| !id.is_empty())
                .collect();

            let total = format!("{} total", credits_label(sequence.total_credits));
            let body = if courses.is_empty() {
                total
            } else {
                format!("{} ({})", courses.join(", "), total)
            };
            self.push(
                format!("major:lab_science:{}", name),
                PassageKind::LabScience,
                format!(
                    "Laboratory Science Option for the {}, {}: {}.",
                    self.context, name, body
                ),
            );
        }

        let cs = &major.computer_science;
        let mut text = headed(
            format!("Required Computer Science for the {}", self.context),
            &cs.description,
        );
        if !cs.courses.is_empty() {
            let listing = course_listing(&cs.courses, "computer science")?;
            text.push_str(&format!(" Courses: {}.", listing));
        }
        self.push(
            "major:computer_science".to_string(),
            PassageKind::MajorRequirement,
            text,
        );

        Ok(())
    }

    fn four_year_plan(&mut self, degrees: &DegreeProgram) {
        for (semester, courses) in &degrees.four_year_plan_guidance {
            let schedule = if courses.is_empty() {
                "no courses scheduled".to_string()
            } else {
                courses.join(", ")
            };
            self.push(
                format!("plan:{}", semester),
                PassageKind::FourYearPlan,
                format!(
                    "Four Year Plan for the {}, {}: {}.",
                    self.context,
                    humanize_key(semester),
                    schedule
                ),
            );
        }
    }

    fn courses(&mut self, courses: &[CourseDefinition]) -> Result<(), KnowledgeBaseError> {
        let mut seen = std::collections::HashSet::new();

        for (position, course) in courses.iter().enumerate() {
            let unit = format!("catalog course #{}", position + 1);
            let id = required(&course.id, &unit, "id")?;
            let name = required(&course.name, &format!("course {}", id), "name")?;
            if !seen.insert(id.to_string()) {
                return Err(KnowledgeBaseError::malformed(
                    format!("course {}", id),
                    "identifier appears more than once in the catalog",
                ));
            }

            let text = self.course_text(id, name, course);
            self.push(format!("course:{}", id), PassageKind::Course, text);
        }

        Ok(())
    }

    fn course_text(&self, id: &str, name: &str, course: &CourseDefinition) -> String {
        let mut text = format!("Course: {} ({}). Credits: {}.", id, name, course.credits);
        if !course.level.trim().is_empty() {
            text.push_str(&format!(" Level: {}.", course.level.trim()));
        }
        if !course.description.trim().is_empty() {
            text.push_str(&format!(" Description: {}", terminated(&course.description)));
        }
        text.push_str(&format!(
            " Prerequisites for {}: {}.",
            id,
            list_or_none(&course.prerequisites)
        ));
        text.push_str(&format!(
            " Corequisites for {}: {}.",
            id,
            list_or_none(&course.corequisites)
        ));

        let offered: Vec<String> = course.offered.iter().map(|s| s.to_string()).collect();
        if offered.is_empty() {
            text.push_str(&format!(" {} has no scheduled semesters.", id));
        } else {
            text.push_str(&format!(" {} is offered: {}.", id, offered.join(", ")));
        }

        if course.core_for_bs_math {
            text.push_str(&format!(
                " {} is a CORE required course for the {}.",
                id, self.program
            ));
        }
        if course.math_option {
            text.push_str(&format!(
                " {} counts toward the Mathematics Option of the {}.",
                id, self.program
            ));
        }
        if let Some(honors) = non_blank(course.honors_section.as_deref()) {
            text.push_str(&format!(" Honors section of {}: {}", id, terminated(honors)));
        }
        if course.satisfies_second_writing {
            text.push_str(&format!(
                " {} satisfies the College Second Writing Requirement.",
                id
            ));
        }
        if !course.restricted_elective_eligible {
            text.push_str(&format!(
                " WARNING: {} does NOT count as a restricted elective.",
                id
            ));
        }

        text
    }
}

fn required<'a>(value: &'a str, unit: &str, field: &str) -> Result<&'a str, KnowledgeBaseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(KnowledgeBaseError::malformed(
            unit,
            format!("required field `{}` is blank", field),
        ))
    } else {
        Ok(trimmed)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn course_listing(courses: &[NamedCourse], unit: &str) -> Result<String, KnowledgeBaseError> {
    let mut entries = Vec::with_capacity(courses.len());
    for course in courses {
        let id = required(&course.id, unit, "id")?;
        let name = course.name.trim();
        let entry = if name.is_empty() {
            format!("{} ({})", id, credits_label(course.credits))
        } else {
            format!("{} {} ({})", id, name, credits_label(course.credits))
        };
        entries.push(entry);
    }
    Ok(entries.join("; "))
}

/// "MATH167 (Math First Year Seminar)", or just the id when the name is blank
fn course_label(id: &str, name: &str) -> String {
    match name.trim() {
        "" => id.to_string(),
        name => format!("{} ({})", id, name),
    }
}

fn list_or_none(items: &[String]) -> String {
    let items: Vec<&str> = items.iter().map(|i| i.trim()).filter(|i| !i.is_empty()).collect();
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

fn credits_label(credits: u32) -> String {
    if credits == 1 {
        "1 credit".to_string()
    } else {
        format!("{} credits", credits)
    }
}

/// Trim and make sure the text ends like a sentence
fn terminated(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.ends_with(['.', '!', '?']) {
        trimmed.to_string()
    } else {
        format!("{}.", trimmed)
    }
}

/// `heading: body.` when the body has content, otherwise just `heading.`
fn headed(heading: String, body: &str) -> String {
    match non_blank(Some(body)) {
        Some(body) => format!("{}: {}", heading, terminated(body)),
        None => format!("{}.", heading),
    }
}

/// "freshman_fall" -> "Freshman Fall"
fn humanize_key(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
