//! The picker: owner of the composite date and the reconciler that keeps its
//! columns consistent.
//!
//! Input arrives as [`Event`] values. Each event is handled to completion before
//! the next one, so the composite date is never observed half-updated.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::ParseError;
use crate::codec::{self, Fields};
use crate::column::{Column, Row, center_index};
use crate::format::Format;
use crate::options::Options;
use crate::types::{Action, Kind};

/// Where the reconciler is in a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    /// A column is being moved; `steps` increments are pending but not committed.
    ///
    /// `start_index` is the picked row when the gesture began. A cancelled drag
    /// leaves the committed value on that row again, so the host scrolls its
    /// list back there.
    Dragging {
        kind: Kind,
        start_index: usize,
        steps: i32,
    },
    /// A column's new value is being committed
    Settling { kind: Kind },
}

/// A gesture step or control action, already translated by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Drag start on a column
    Begin(Kind),
    /// Intermediate movement by `rows` rows (positive moves toward later values)
    Drag { kind: Kind, rows: i32 },
    /// Gesture end; the pending movement is committed
    Release(Kind),
    /// Gesture abort; the pending movement is discarded
    Cancel(Kind),
    /// Click on a row of the rendered window
    Pick { kind: Kind, index: usize },
    /// Next/prev control
    Step { kind: Kind, action: Action },
}

/// A committed change of the composite date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub date: NaiveDateTime,
    /// `date` rendered with the picker's format
    pub value: String,
}

/// What handling an event produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Columns whose rows must be rendered again
    pub repaint: Vec<Kind>,
    /// Set only when a commit changed the composite date
    pub change: Option<Change>,
}

impl Outcome {
    fn repainting(kind: Kind) -> Self {
        Self {
            repaint: vec![kind],
            change: None,
        }
    }
}

/// Date/time picker state for one bound element.
#[derive(Debug, Clone)]
pub struct Picker {
    options: Arc<Options>,
    format: Format,
    columns: Vec<Column>,
    date: NaiveDateTime,
    initial: NaiveDateTime,
    state: State,
}

impl Picker {
    /// Creates a picker for an element whose current text is `value`.
    ///
    /// The initial date is `options.date()` if set, else `value`, read with the
    /// configured format. When neither can be read the current local time is used.
    pub fn new(value: Option<&str>, options: Arc<Options>) -> Self {
        let format = Format::parse(options.format());
        let initial = options
            .date()
            .or(value)
            .and_then(|text| match format.parse_value(text, &options, baseline()) {
                Ok(date) => Some(date),
                Err(err) => {
                    tracing::debug!(value = text, error = %err, "unreadable initial value, using now");
                    None
                }
            })
            .unwrap_or_else(now);

        Self::assemble(format, initial, options)
    }

    /// Creates a picker showing `date`.
    pub fn with_date(date: NaiveDateTime, options: Arc<Options>) -> Self {
        let format = Format::parse(options.format());
        Self::assemble(format, date, options)
    }

    fn assemble(format: Format, date: NaiveDateTime, options: Arc<Options>) -> Self {
        if format.is_static() {
            tracing::warn!(
                format = format.source(),
                "format has no date or time tokens, the picker shows static text"
            );
        }

        let mut columns: Vec<Column> = Vec::new();
        for token in format.tokens() {
            if columns.iter().all(|column| column.kind() != token.kind()) {
                columns.push(Column::build(token, &options));
            }
        }

        let date = truncate(date);
        codec::to_columns(&date, &mut columns);

        Self {
            options,
            format,
            columns,
            date,
            initial: date,
            state: State::Idle,
        }
    }

    pub fn options(&self) -> &Arc<Options> {
        &self.options
    }

    pub const fn format(&self) -> &Format {
        &self.format
    }

    /// Columns in display order, one per token kind
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, kind: Kind) -> Option<&Column> {
        self.columns.iter().find(|column| column.kind() == kind)
    }

    pub const fn state(&self) -> State {
        self.state
    }

    /// The committed composite date
    pub const fn date(&self) -> NaiveDateTime {
        self.date
    }

    /// The date the picker was created with
    pub const fn initial_date(&self) -> NaiveDateTime {
        self.initial
    }

    /// The committed date rendered with the picker's format
    pub fn value(&self) -> String {
        self.format.render(&self.fields(), &self.options)
    }

    /// What the host writes back to the element when the user confirms.
    pub fn pick(&self) -> Change {
        Change {
            date: self.date,
            value: self.value(),
        }
    }

    /// Replaces the composite date without notifying. Any gesture in progress is dropped.
    pub fn set_date(&mut self, date: NaiveDateTime) {
        self.abort_gesture();
        self.date = truncate(date);
        codec::to_columns(&self.date, &mut self.columns);
    }

    /// Reads `text` with the picker's format and shows it.
    ///
    /// # Errors
    /// Returns the `ParseError` from reading `text`; the picker is left unchanged.
    pub fn set_value(&mut self, text: &str) -> Result<(), ParseError> {
        let date = self.format.parse_value(text, &self.options, baseline())?;
        self.set_date(date);
        Ok(())
    }

    /// Rows to paint for a column, following a drag in progress on it.
    pub fn rows(&self, kind: Kind) -> Option<Vec<Row>> {
        let steps = match self.state {
            State::Dragging { kind: dragged, steps, .. } if dragged == kind => steps,
            _ => 0,
        };
        self.column(kind)
            .map(|column| column.rows(&self.fields(), &self.options, steps))
    }

    pub fn next(&mut self, kind: Kind) -> Outcome {
        self.handle(Event::Step {
            kind,
            action: Action::Next,
        })
    }

    pub fn prev(&mut self, kind: Kind) -> Outcome {
        self.handle(Event::Step {
            kind,
            action: Action::Prev,
        })
    }

    /// Goes back to the initial date through the normal commit path.
    pub fn reset(&mut self) -> Outcome {
        self.abort_gesture();
        self.commit(self.initial, None)
    }

    /// Advances the state machine by one event.
    ///
    /// `Pick` and `Step` end any gesture in progress, discarding its pending
    /// movement, and commit relative to the committed value. Events naming a
    /// column the format does not have, or a column other than the one being
    /// dragged, are ignored.
    pub fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::Begin(kind) => self.begin(kind),
            Event::Drag { kind, rows } => self.drag(kind, rows),
            Event::Release(kind) => match self.state {
                State::Dragging {
                    kind: dragged,
                    steps,
                    ..
                } if dragged == kind => self.settle(kind, steps),
                _ => self.ignore(kind),
            },
            Event::Cancel(kind) => match self.state {
                State::Dragging {
                    kind: dragged,
                    start_index,
                    steps,
                } if dragged == kind => {
                    tracing::trace!(%kind, start_index, steps, "drag cancelled");
                    self.state = State::Idle;
                    Outcome::repainting(kind)
                }
                _ => self.ignore(kind),
            },
            Event::Pick { kind, index } => {
                let center = i64::try_from(center_index(self.options.rows())).unwrap_or(0);
                let steps = i64::try_from(index).unwrap_or(i64::MAX) - center;
                let steps = i32::try_from(steps).unwrap_or(i32::MAX);
                self.step_from_idle(kind, steps)
            }
            Event::Step { kind, action } => self.step_from_idle(kind, action.delta()),
        }
    }

    fn begin(&mut self, kind: Kind) -> Outcome {
        let Some(start_index) = self.column(kind).map(Column::selected_index) else {
            return self.ignore(kind);
        };

        let mut outcome = Outcome::default();
        if let Some(aborted) = self.abort_gesture() {
            outcome.repaint.push(aborted);
        }
        self.state = State::Dragging {
            kind,
            start_index,
            steps: 0,
        };
        outcome
    }

    fn drag(&mut self, kind: Kind, rows: i32) -> Outcome {
        match self.state {
            State::Dragging {
                kind: dragged,
                start_index,
                steps,
            } if dragged == kind => {
                let steps = steps.saturating_add(rows);
                tracing::trace!(%kind, steps, "drag");
                self.state = State::Dragging {
                    kind,
                    start_index,
                    steps,
                };
                Outcome::repainting(kind)
            }
            _ => self.ignore(kind),
        }
    }

    fn step_from_idle(&mut self, kind: Kind, steps: i32) -> Outcome {
        let aborted = self.abort_gesture();
        let mut outcome = self.settle(kind, steps);
        if let Some(aborted) = aborted.filter(|aborted| !outcome.repaint.contains(aborted)) {
            outcome.repaint.push(aborted);
        }
        outcome
    }

    /// Commits `steps` increments on one column and reconciles the rest.
    fn settle(&mut self, kind: Kind, steps: i32) -> Outcome {
        let fields = self.fields();
        let wrap = self.options.wrap();
        let Some(position) = self.columns.iter().position(|column| column.kind() == kind) else {
            return self.ignore(kind);
        };

        self.state = State::Settling { kind };
        let column = &mut self.columns[position];
        let target = column.stepped(steps, &fields, wrap);
        column.seed(target);

        let date = codec::from_columns(&self.columns, &self.date);
        self.commit(date, Some(kind))
    }

    /// Replaces the composite date, re-derives every column from it and reports
    /// what changed.
    fn commit(&mut self, date: NaiveDateTime, origin: Option<Kind>) -> Outcome {
        let previous = self.date;
        let previous_fields = self.fields();
        let before: Vec<i32> = self.columns.iter().map(Column::current).collect();

        self.date = date;
        codec::to_columns(&self.date, &mut self.columns);
        let fields = self.fields();

        let repaint = self
            .columns
            .iter()
            .zip(before)
            .filter(|(column, before)| {
                let moved = column.current() != *before;
                if moved && column.is_dynamic() && origin != Some(column.kind()) {
                    tracing::debug!(
                        kind = %column.kind(),
                        from = *before,
                        to = column.current(),
                        "clamped to the new range"
                    );
                }
                origin == Some(column.kind())
                    || moved
                    || (column.is_dynamic()
                        && column.bounds(&previous_fields) != column.bounds(&fields))
            })
            .map(|(column, _)| column.kind())
            .collect();

        self.state = State::Idle;

        let change = (self.date != previous).then(|| Change {
            date: self.date,
            value: self.value(),
        });
        if let Some(change) = &change {
            tracing::debug!(value = %change.value, "committed");
        }

        Outcome { repaint, change }
    }

    fn abort_gesture(&mut self) -> Option<Kind> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Dragging { kind, .. } => Some(kind),
            State::Idle | State::Settling { .. } => None,
        }
    }

    fn ignore(&self, kind: Kind) -> Outcome {
        tracing::trace!(%kind, state = ?self.state, "event ignored");
        Outcome::default()
    }

    fn fields(&self) -> Fields {
        Fields::from_date(&self.date)
    }
}

/// Drops precision below a millisecond, which no column can show
fn truncate(date: NaiveDateTime) -> NaiveDateTime {
    Fields::from_date(&date).to_date().unwrap_or(date)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Today at midnight; fields a format leaves out are read from here
fn baseline() -> NaiveDateTime {
    Local::now().date_naive().and_time(NaiveTime::MIN)
}
