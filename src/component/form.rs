use chrono::{Duration, Local, NaiveDate};
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::Component;
use crate::crop::{parse_date, NewCrop, CROP_NAMES, GROWTH_STAGES, PEST_CONTROL_MEASURES};
use crate::update::Update;

const DATE_LEN: usize = 10;
const YIELD_DIGITS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    CropName,
    PlantingDate,
    HarvestDate,
    GrowthStage,
    PestControl,
    YieldPrediction,
}

impl FormField {
    const ALL: [FormField; 6] = [
        FormField::CropName,
        FormField::PlantingDate,
        FormField::HarvestDate,
        FormField::GrowthStage,
        FormField::PestControl,
        FormField::YieldPrediction,
    ];

    fn label(self) -> &'static str {
        match self {
            FormField::CropName => "Crop Name",
            FormField::PlantingDate => "Planting Date",
            FormField::HarvestDate => "Harvest Date",
            FormField::GrowthStage => "Growth Stage",
            FormField::PestControl => "Pest Control Measures",
            FormField::YieldPrediction => "Yield Prediction (kg)",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub enum FormMsg {
    NextField,
    PrevField,
    Increment,
    Decrement,
    Input(char),
    Backspace,
    Submit,
    /// Bubbled to the dashboard.
    Submitted(NewCrop),
    /// Bubbled to the dashboard.
    Invalid(String),
}

/// Manual entry form. Selectors cycle through the fixed vocabularies;
/// dates and yield are typed.
pub struct FormComponent {
    field: FormField,
    crop: usize,
    stage: usize,
    pest: usize,
    planting: String,
    harvest: String,
    yield_text: String,
}

impl FormComponent {
    pub fn new() -> Self {
        Self::with_today(Local::now().date_naive())
    }

    pub fn with_today(today: NaiveDate) -> Self {
        let today = today.format("%Y-%m-%d").to_string();
        Self {
            field: FormField::CropName,
            crop: 0,
            stage: 0,
            pest: 0,
            planting: today.clone(),
            harvest: today,
            yield_text: "0".to_string(),
        }
    }

    /// Build the record as entered. Harvest before planting is accepted.
    pub fn to_new_crop(&self) -> Result<NewCrop, String> {
        let planting_date = parse_date(&self.planting)
            .map_err(|_| format!("Invalid planting date '{}', expected YYYY-MM-DD", self.planting))?;
        let harvest_date = parse_date(&self.harvest)
            .map_err(|_| format!("Invalid harvest date '{}', expected YYYY-MM-DD", self.harvest))?;
        let yield_prediction = self
            .yield_text
            .parse::<u32>()
            .map_err(|_| format!("Invalid yield prediction '{}'", self.yield_text))?;
        Ok(NewCrop {
            crop_name: CROP_NAMES[self.crop].to_string(),
            planting_date,
            harvest_date,
            growth_stage: GROWTH_STAGES[self.stage].to_string(),
            pest_control_measures: PEST_CONTROL_MEASURES[self.pest].to_string(),
            yield_prediction,
        })
    }

    fn cycle(index: &mut usize, len: usize, forward: bool) {
        *index = if forward {
            (*index + 1) % len
        } else {
            (*index + len - 1) % len
        };
    }

    fn step(&mut self, forward: bool) {
        match self.field {
            FormField::CropName => Self::cycle(&mut self.crop, CROP_NAMES.len(), forward),
            FormField::GrowthStage => Self::cycle(&mut self.stage, GROWTH_STAGES.len(), forward),
            FormField::PestControl => {
                Self::cycle(&mut self.pest, PEST_CONTROL_MEASURES.len(), forward)
            }
            FormField::PlantingDate => Self::shift_date(&mut self.planting, forward),
            FormField::HarvestDate => Self::shift_date(&mut self.harvest, forward),
            FormField::YieldPrediction => {
                let current = self.yield_text.parse::<u32>().unwrap_or(0);
                let next = if forward {
                    current.saturating_add(1)
                } else {
                    current.saturating_sub(1)
                };
                self.yield_text = next.to_string();
            }
        }
    }

    fn shift_date(text: &mut String, forward: bool) {
        if let Ok(date) = parse_date(text) {
            let days = if forward { 1 } else { -1 };
            if let Some(shifted) = date.checked_add_signed(Duration::days(days)) {
                *text = shifted.format("%Y-%m-%d").to_string();
            }
        }
    }

    fn input(&mut self, c: char) {
        match self.field {
            FormField::PlantingDate | FormField::HarvestDate => {
                let text = if self.field == FormField::PlantingDate {
                    &mut self.planting
                } else {
                    &mut self.harvest
                };
                if (c.is_ascii_digit() || c == '-') && text.len() < DATE_LEN {
                    text.push(c);
                }
            }
            FormField::YieldPrediction => {
                if c.is_ascii_digit() && self.yield_text.len() < YIELD_DIGITS {
                    if self.yield_text == "0" {
                        self.yield_text.clear();
                    }
                    self.yield_text.push(c);
                }
            }
            _ => {}
        }
    }

    fn backspace(&mut self) {
        match self.field {
            FormField::PlantingDate => {
                self.planting.pop();
            }
            FormField::HarvestDate => {
                self.harvest.pop();
            }
            FormField::YieldPrediction => {
                self.yield_text.pop();
            }
            _ => {}
        }
    }

    fn value(&self, field: FormField) -> String {
        match field {
            FormField::CropName => format!("< {} >", CROP_NAMES[self.crop]),
            FormField::GrowthStage => format!("< {} >", GROWTH_STAGES[self.stage]),
            FormField::PestControl => format!("< {} >", PEST_CONTROL_MEASURES[self.pest]),
            FormField::PlantingDate => self.planting.clone(),
            FormField::HarvestDate => self.harvest.clone(),
            FormField::YieldPrediction => self.yield_text.clone(),
        }
    }
}

impl Component for FormComponent {
    type Msg = FormMsg;

    fn update(&mut self, msg: Self::Msg) -> Update<Self::Msg> {
        match msg {
            FormMsg::NextField => {
                self.field = self.field.next();
                Update::none()
            }
            FormMsg::PrevField => {
                self.field = self.field.prev();
                Update::none()
            }
            FormMsg::Increment => self.step(true).into(),
            FormMsg::Decrement => self.step(false).into(),
            FormMsg::Input(c) => self.input(c).into(),
            FormMsg::Backspace => self.backspace().into(),
            FormMsg::Submit => match self.to_new_crop() {
                Ok(crop) => FormMsg::Submitted(crop).into(),
                Err(e) => FormMsg::Invalid(e).into(),
            },
            FormMsg::Submitted(_) | FormMsg::Invalid(_) => Update::none(), // Handled by parent
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Update<Self::Msg> {
        use crossterm::event::KeyCode::*;
        match key.code {
            Down => FormMsg::NextField.into(),
            Up => FormMsg::PrevField.into(),
            Right => FormMsg::Increment.into(),
            Left => FormMsg::Decrement.into(),
            Backspace => FormMsg::Backspace.into(),
            Enter => FormMsg::Submit.into(),
            Char(c) => FormMsg::Input(c).into(),
            _ => Update::none(),
        }
    }

    fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        let mut lines: Vec<Line> = FormField::ALL
            .iter()
            .map(|field| {
                let selected = focused && *field == self.field;
                let marker = if selected { "▶ " } else { "  " };
                let value_style = if selected {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(format!("{}{:<23}", marker, field.label())),
                    Span::styled(self.value(*field), value_style),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[Enter] Insert Record",
            Style::default().fg(Color::Green),
        )));

        let block = Block::default()
            .title("Insert a New Crop Record")
            .borders(Borders::ALL)
            .border_style(border);
        f.render_widget(Paragraph::new(lines).block(block), area);
    }
}
