use chs_schema::{DocumentType, FieldDefinition, Preview, PreviewRule, ValueType};

const FLAGSHIP_MARKER: &str = "⭐";

fn required_text(name: &str, title: &str, description: &str) -> FieldDefinition {
    FieldDefinition::text(name)
        .title(title)
        .description(description)
        .required()
}

fn feature() -> ValueType {
    ValueType::member(
        "feature",
        "Feature",
        vec![
            FieldDefinition::text("title").title("Title").required(),
            FieldDefinition::long_text("description", 2)
                .title("Description")
                .required(),
            FieldDefinition::text("icon")
                .title("Icon")
                .description("Optional icon identifier"),
        ],
    )
    .with_preview(
        PreviewRule::new()
            .select("title", "title")
            .select("subtitle", "description"),
    )
}

pub fn chapter() -> DocumentType {
    DocumentType::new("chapter", "Chapter")
        .field(required_text(
            "societyId",
            "Society ID",
            "URL-friendly identifier (e.g., \"robinson\", \"lakes\")",
        ))
        .field(required_text(
            "name",
            "Chapter Name",
            "Full name (e.g., \"CHS Robinson\")",
        ))
        .field(required_text(
            "displayName",
            "Display Name",
            "Short name for cards (e.g., \"Robinson\")",
        ))
        .field(required_text(
            "location",
            "Location",
            "City, State/Country (e.g., \"Tampa, FL\")",
        ))
        .field(
            FieldDefinition::long_text("description", 3)
                .title("Description")
                .description("Brief chapter description for directory cards")
                .required(),
        )
        .field(required_text(
            "founded",
            "Founded Year",
            "Year the chapter was established",
        ))
        .field(
            FieldDefinition::text("tallyContactFormId")
                .title("Tally Contact Form ID")
                .description("Optional Tally form ID for chapter contact form"),
        )
        .field(
            FieldDefinition::object(
                "stats",
                vec![
                    FieldDefinition::number("members")
                        .title("Members")
                        .required()
                        .min(0.0),
                    FieldDefinition::number("events")
                        .title("Events")
                        .required()
                        .min(0.0),
                    FieldDefinition::number("workshops")
                        .title("Workshops")
                        .min(0.0),
                ],
            )
            .title("Statistics"),
        )
        .field(
            FieldDefinition::sequence("strategists", ValueType::reference("strategist"))
                .title("Strategists"),
        )
        .field(
            FieldDefinition::sequence("achievements", ValueType::Text)
                .title("Achievements")
                .description("List of chapter accomplishments"),
        )
        .field(
            FieldDefinition::boolean("isFlagship")
                .title("Flagship Chapter")
                .description("Enable flagship layout.")
                .default_value(false),
        )
        .field(
            FieldDefinition::number("chapterIndex")
                .title("Chapter Index")
                .description("Display as CHS-1, CHS-2, etc. in the index badge")
                .required()
                .min(1.0),
        )
        .field(required_text(
            "tagline",
            "Tagline",
            "Short tagline for hero section",
        ))
        .field(
            FieldDefinition::image("heroImage", true)
                .title("Hero Image")
                .description("Hero section image")
                .required(),
        )
        .field(
            FieldDefinition::long_text("overview", 3)
                .title("Overview")
                .description("Brief overview paragraph")
                .required(),
        )
        .field(
            FieldDefinition::sequence("features", feature())
                .title("Focus Areas")
                .description("Chapter focus areas/features displayed in grid"),
        )
        .preview(
            PreviewRule::new()
                .select("title", "name")
                .select("subtitle", "location")
                .select("isFlagship", "isFlagship")
                .prepare(|s| {
                    let base = Preview::from_selection(s);
                    let title = if s.is_truthy("isFlagship") {
                        format!("{} {FLAGSHIP_MARKER}", base.title)
                    } else {
                        base.title
                    };
                    Preview { title, ..base }
                }),
        )
}
