use std::io::{self, Write};

use anyhow::Context;
use console::Style;

use crate::ProgError;
use passgen::strength::MAX_SCORE;
use passgen::{Strength, StrengthAssessment};

const METER_WIDTH: usize = 24;

pub(crate) fn assess_password(password: Option<String>, json: bool) -> Result<(), ProgError> {
    let password = match password {
        Some(p) => p,
        None => {
            rpassword::prompt_password("Password: ").context("failed to read password from TTY")?
        }
    };
    let assessment = passgen::assess(&password);

    if json {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer(&mut stdout, &assessment)
            .context("failed to write the assessment as JSON to stdout")?;
        writeln!(stdout).context("failed to write to stdout")?;
    } else {
        println!("{}", render_meter(&assessment, false));
    }
    Ok(())
}

/// A coloured bar, the category and the raw score, e.g. `████████░░░░ Medium (5/8)`.
pub(crate) fn render_meter(assessment: &StrengthAssessment, for_stderr: bool) -> String {
    let mut style = match assessment.category {
        Strength::Weak => Style::new().red(),
        Strength::Medium => Style::new().yellow(),
        Strength::Strong => Style::new().green(),
    };
    if for_stderr {
        style = style.for_stderr();
    }

    let filled = ((assessment.category.meter_fraction() * METER_WIDTH as f32).round() as usize)
        .min(METER_WIDTH);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(METER_WIDTH - filled));
    format!(
        "{} {} ({}/{})",
        style.apply_to(bar),
        style.clone().bold().apply_to(assessment.category),
        assessment.score,
        MAX_SCORE
    )
}
