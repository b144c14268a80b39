use chs_schema::{
    DocumentType, FieldDefinition, OptionList, Preview, PreviewRule, Result, Rule, SelectOption,
    SiblingContext, ValueType, Validator, is_iso_date, is_truthy,
};
use serde_json::Value;

pub const END_BEFORE_START: &str = "End date must be after start date";
pub const AMOUNT_REQUIRED: &str = "Amount is required when salary is enabled";
pub const AMOUNT_NEGATIVE: &str = "Amount must be positive";

const ACTIVE_MARKER: &str = "🟢";
const INACTIVE_MARKER: &str = "⚫";
const UNTITLED_ROLE: &str = "Untitled Role";

/// `HH:MM - HH:MM`, 24-hour clock, optional spaces around the dash.
const WORKING_HOURS_PATTERN: &str = r"^\d{2}:\d{2}\s*-\s*\d{2}:\d{2}$";

/// Expected end date must fall strictly after the expected start date.
///
/// Passes when either date is missing or the start date is malformed; a
/// malformed start is reported by its own field. Dates are compared as ISO
/// strings.
pub struct EndAfterStart;

impl Rule for EndAfterStart {
    fn name(&self) -> &str {
        "end-after-start"
    }

    fn check(
        &self,
        value: Option<&Value>,
        siblings: &SiblingContext<'_>,
    ) -> std::result::Result<(), String> {
        let Some(start) = siblings
            .get("expectedStartDate")
            .filter(|v| is_truthy(v))
        else {
            return Ok(());
        };
        let Some(end) = value else {
            return Ok(());
        };
        match (end.as_str(), start.as_str()) {
            (Some(end), Some(start)) if is_iso_date(start) && end <= start => {
                Err(END_BEFORE_START.into())
            }
            _ => Ok(()),
        }
    }
}

/// A salaried role needs a positive amount.
pub struct SalaryAmount;

impl Rule for SalaryAmount {
    fn name(&self) -> &str {
        "salary-amount"
    }

    fn check(
        &self,
        value: Option<&Value>,
        siblings: &SiblingContext<'_>,
    ) -> std::result::Result<(), String> {
        if !siblings.is_truthy("salary") {
            return Ok(());
        }
        if !value.is_some_and(is_truthy) {
            return Err(AMOUNT_REQUIRED.into());
        }
        match value.and_then(Value::as_f64) {
            Some(amount) if amount < 0.0 => Err(AMOUNT_NEGATIVE.into()),
            _ => Ok(()),
        }
    }
}

fn bullet_list(name: &str, title: &str, description: &str) -> FieldDefinition {
    FieldDefinition::sequence(name, ValueType::Text)
        .title(title)
        .description(description)
}

fn overview_block() -> ValueType {
    ValueType::Block {
        styles: vec![SelectOption::new("Normal", "normal")],
        decorators: vec![
            SelectOption::new("Bold", "strong"),
            SelectOption::new("Italic", "em"),
        ],
    }
}

fn communication() -> Result<FieldDefinition> {
    let timezones = OptionList::new(&[
        ("UTC", "UTC"),
        ("EST (UTC-5)", "EST"),
        ("CST (UTC-6)", "CST"),
        ("PST (UTC-8)", "PST"),
        ("GMT (UTC+0)", "GMT"),
        ("CET (UTC+1)", "CET"),
        ("IST (UTC+5:30)", "IST"),
        ("JST (UTC+9)", "JST"),
        ("AEST (UTC+10)", "AEST"),
    ]);
    let frequencies = OptionList::new(&[
        ("from time to time", "daily"),
        ("bi-weekly", "bi-weekly"),
    ]);

    Ok(FieldDefinition::object(
        "communication",
        vec![
            FieldDefinition::boolean("asynchronous")
                .title("Asynchronous")
                .description("Whether this role communicates asynchronously without fixed hours")
                .default_value(true),
            FieldDefinition::text("workingHours")
                .title("Working Hours")
                .description("Format: HH:MM - HH:MM (24h)")
                .hidden_when("asynchronous")
                .validator(Validator::regex(WORKING_HOURS_PATTERN, "24h time range")?),
            FieldDefinition::enumeration("timezone", timezones)
                .title("Timezone")
                .description("Primary timezone for synchronous work")
                .hidden_when("asynchronous"),
            FieldDefinition::text("language")
                .title("Language")
                .description("Primary language used for communication")
                .default_value("English"),
            FieldDefinition::boolean("liveCollaboration")
                .title("Live Collaboration")
                .description("Whether this role involves real-time meetings or pair work")
                .default_value(true),
            FieldDefinition::enumeration("collaborationFrequency", frequencies)
                .title("Collaboration Frequency")
                .description("How often live collaboration sessions occur")
                .hidden_unless("liveCollaboration"),
        ],
    )
    .title("Communication")
    .description("Communication expectations and schedule"))
}

fn duration() -> FieldDefinition {
    FieldDefinition::object(
        "duration",
        vec![
            FieldDefinition::boolean("ongoing")
                .title("Ongoing")
                .description("Whether this role has no fixed end date")
                .default_value(true),
            FieldDefinition::date("expectedStartDate")
                .title("Expected Start Date")
                .hidden_when("ongoing"),
            FieldDefinition::date("expectedEndDate")
                .title("Expected End Date")
                .hidden_when("ongoing")
                .custom(EndAfterStart),
        ],
    )
    .title("Duration")
    .description("Time commitment and contract length")
}

fn compensation() -> FieldDefinition {
    FieldDefinition::object(
        "compensation",
        vec![
            FieldDefinition::boolean("salary")
                .title("Salary")
                .description("Whether this role includes monetary compensation")
                .default_value(false),
            FieldDefinition::number("amount")
                .title("Amount")
                .description("Salary amount in USD")
                .default_value(0)
                .hidden_unless("salary")
                .custom(SalaryAmount),
            FieldDefinition::sequence("benefits", ValueType::Text)
                .title("Benefits")
                .description("Non-monetary perks and benefits offered"),
        ],
    )
    .title("Compensation")
    .description("Pay and benefits details")
}

pub fn role() -> Result<DocumentType> {
    Ok(DocumentType::new("role", "Role")
        .field(
            FieldDefinition::boolean("active")
                .title("Active")
                .description("Whether this role is currently open for applications")
                .default_value(false),
        )
        .field(
            FieldDefinition::slug("slug", "name", 96)
                .title("Slug")
                .description("URL-friendly identifier for this role")
                .required(),
        )
        .field(
            FieldDefinition::text("name")
                .title("Name")
                .description("Job title for this role")
                .required(),
        )
        .field(
            FieldDefinition::enumeration(
                "team",
                OptionList::new(&[
                    ("Operations", "operations"),
                    ("Safety", "safety"),
                    ("MUN", "mun"),
                ]),
            )
            .title("Team")
            .description("Which team this role belongs to")
            .required(),
        )
        .field(
            FieldDefinition::enumeration(
                "workMode",
                OptionList::new(&[
                    ("Remote", "remote"),
                    ("Hybrid", "hybrid"),
                    ("On-Site", "on-site"),
                ])
                .radio(),
            )
            .title("Work Mode")
            .description("Where this role is performed")
            .required(),
        )
        .field(
            FieldDefinition::text("region")
                .title("Region")
                .description("Geographic region for this role")
                .default_value("International"),
        )
        .field(
            FieldDefinition::sequence("overview", overview_block())
                .title("Overview")
                .description("General description of the role"),
        )
        .field(bullet_list(
            "responsibilities",
            "Responsibilities",
            "Key responsibilities and duties for this role. Shown as bullet points (\"In this role you'll:\")",
        ))
        .field(bullet_list(
            "requirements",
            "Requirements",
            "Minimum qualifications and skills needed. Shown as bullet points.",
        ))
        .field(bullet_list(
            "exceptionalPoints",
            "Exceptional Points",
            "Nice-to-have qualifications that set candidates apart. Shown as bullet points.",
        ))
        .field(bullet_list(
            "whatYouWillLearn",
            "What You Will Learn",
            "Skills and knowledge gained in this role. Shown as bullet points (\"In this role you'll learn:\")",
        ))
        .field(
            FieldDefinition::number("workload")
                .title("Workload")
                .description("Hours per week")
                .min(1.0)
                .less_than(24.0),
        )
        .field(communication()?)
        .field(duration())
        .field(compensation())
        .field(
            FieldDefinition::boolean("specialisedCompetencyAssessment")
                .title("Specialised Competency Assessment")
                .description("Whether applicants must complete a skills assessment")
                .default_value(false),
        )
        .preview(
            PreviewRule::new()
                .select("title", "name")
                .select("active", "active")
                .select("workMode", "workMode")
                .prepare(|s| {
                    let marker = if s.is_truthy("active") {
                        ACTIVE_MARKER
                    } else {
                        INACTIVE_MARKER
                    };
                    let title = s.text("title").unwrap_or_else(|| UNTITLED_ROLE.into());
                    Preview {
                        title: format!("{marker} {title}"),
                        subtitle: s.text("workMode"),
                        media: None,
                    }
                }),
        ))
}
