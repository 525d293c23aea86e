//! Static write-up shown beside the charts.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct Hypothesis {
    pub statement: &'static str,
    pub result: &'static str,
}

pub const OBJECTIVES: &[&str] = &[
    "Country Spending Analysis: determine whether some countries spend more money in USD than others.",
    "Category Popularity Analysis: find which merchant categories are more popular in some countries than in others.",
];

pub const HYPOTHESES: &[Hypothesis] = &[
    Hypothesis {
        statement: "USA and Europe regions are expected to spend more money in USD than other regions.",
        result: "Incorrect. The highest spending countries were Mexico, Brazil and Russia, in that order.",
    },
    Hypothesis {
        statement: "The most popular merchant categories in top spending countries differ from those in regions that spend less.",
        result: "Incorrect. The same categories lead everywhere; top spending countries spend larger amounts in each.",
    },
    Hypothesis {
        statement: "Transaction count should be higher in countries that spend more money.",
        result: "Incorrect. Transaction count did not track total spending; some countries with fewer transactions spent more through larger amounts.",
    },
];

pub const CONCLUSIONS: &[&str] = &[
    "The highest spending countries were Mexico, Brazil and Russia rather than the USA or Europe.",
    "Merchant category preferences were similar across countries; high spenders spent more in each category.",
    "Transaction count was not correlated with total spending.",
    "The spending distribution by country and category can guide decisions about expanding into new markets.",
    "Currency usage varied significantly between countries.",
];

pub const FUTURE_WORK: &[&str] = &[
    "Apply more advanced statistical analysis to uncover deeper patterns and correlations.",
    "Build a fraud detection model on top of these findings.",
    "Let users explore the data interactively with custom filters.",
    "Bring in economic or demographic data for context on transaction patterns.",
    "Run a time-series analysis for trends and seasonality by country and category.",
    "Investigate why Mexico, Brazil and Russia spend so much.",
    "Relate exchange-rate movements to spending patterns per country.",
    "Forecast spending from historical data and external factors.",
];

pub const PROJECT_URL: &str = "https://github.com/bani2016up/DSBA-project-1";

/// Panel text: objectives, hypotheses, conclusions, future work.
pub fn lines() -> Vec<Line<'static>> {
    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![Line::from(Span::styled("Objectives", heading))];
    lines.extend(numbered(OBJECTIVES));
    for (i, h) in HYPOTHESES.iter().enumerate() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(format!("Hypothesis {}", i + 1), heading)));
        lines.push(Line::from(vec![Span::styled("Statement: ", bold), Span::raw(h.statement)]));
        lines.push(Line::from(vec![Span::styled("Result: ", bold), Span::raw(h.result)]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Conclusions", heading)));
    lines.extend(numbered(CONCLUSIONS));

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("Future Work", heading)));
    lines.extend(FUTURE_WORK.iter().map(|item| Line::raw(format!("- {item}"))));

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![Span::styled("Project: ", bold), Span::raw(PROJECT_URL)]));
    lines
}

fn numbered(items: &'static [&'static str]) -> impl Iterator<Item = Line<'static>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| Line::raw(format!("{}. {item}", i + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn panel_lists_conclusions_after_hypotheses() {
        let rendered: Vec<String> = lines().iter().map(text).collect();
        let at = |needle: &str| rendered.iter().position(|l| l == needle).unwrap();

        let last_hypothesis = at(&format!("Hypothesis {}", HYPOTHESES.len()));
        let conclusions = at("Conclusions");
        assert!(conclusions > last_hypothesis);
        for (i, c) in CONCLUSIONS.iter().enumerate() {
            assert_eq!(rendered[conclusions + 1 + i], format!("{}. {c}", i + 1));
        }
        assert!(at("Future Work") > conclusions);
        assert!(rendered.last().unwrap().ends_with(PROJECT_URL));
    }
}
