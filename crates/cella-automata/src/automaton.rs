//! Generation stepping.

use crate::config::{AutomatonConfig, Boundary};
use crate::{AutomatonError, Cell, Grid, MAX_STATES, Rule};
use tracing::{debug, warn};

/// A 2D cellular automaton over `num_states` states.
///
/// Holds the current grid (read during a step), the next grid (written
/// during a step) and the ordered rules. [`Automaton::step`] never swaps the
/// grids or touches borders; that is left to the caller, either directly via
/// [`Automaton::swap_grids`] and [`Automaton::set_borders_toroidal`] or via
/// [`Automaton::run`].
///
/// ```
/// use cella_automata::{Automaton, presets};
///
/// let mut life = Automaton::new(5, 5, 2).unwrap();
/// life.set_rules(presets::game_of_life()).unwrap();
/// for x in 1..4 {
///     life.current_grid_mut().set(x, 2, 1);
/// }
///
/// life.step().unwrap();
/// life.swap_grids();
/// assert_eq!(life.current_grid().get(2, 1), 1);
/// assert_eq!(life.current_grid().get(1, 2), 0);
/// assert_eq!(life.generation(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Automaton {
    num_states: usize,
    current: Grid,
    next: Grid,
    rules: Vec<Rule>,
    generation: u64,
    cells_per_state: Vec<usize>,
    boundary: Boundary,
}

impl Automaton {
    /// Creates an automaton with two zeroed grids and no rules.
    pub fn new(width: usize, height: usize, num_states: usize) -> Result<Self, AutomatonError> {
        if !(2..=MAX_STATES).contains(&num_states) {
            return Err(AutomatonError::InvalidStateCount(num_states));
        }
        let current = Grid::new(width, height)?;
        let next = current.clone();
        debug!(width, height, num_states, "created automaton");
        Ok(Self {
            num_states,
            current,
            next,
            rules: Vec::new(),
            generation: 0,
            cells_per_state: vec![0; num_states],
            boundary: Boundary::Fixed,
        })
    }

    /// Builds an automaton from a config, compiling every rule.
    ///
    /// Unlike [`Rule::new`], a condition that does not parse fails here.
    pub fn from_config(config: &AutomatonConfig) -> Result<Self, AutomatonError> {
        let mut automaton = Self::new(config.width, config.height, config.num_states)?;
        let rules = config
            .rules
            .iter()
            .map(|r| Rule::try_new(r.condition.as_str(), r.target, config.num_states))
            .collect::<Result<Vec<_>, _>>()?;
        automaton.set_rules(rules)?;
        automaton.boundary = config.boundary;
        Ok(automaton)
    }

    /// Returns the width.
    pub fn width(&self) -> usize {
        self.current.width()
    }

    /// Returns the height.
    pub fn height(&self) -> usize {
        self.current.height()
    }

    /// Returns the number of states.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Returns the generation counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Overrides the generation counter.
    pub fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// Returns the boundary applied by [`Automaton::run`].
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Sets the boundary applied by [`Automaton::run`].
    pub fn set_boundary(&mut self, boundary: Boundary) {
        self.boundary = boundary;
    }

    /// Returns the current grid.
    pub fn current_grid(&self) -> &Grid {
        &self.current
    }

    /// Returns the current grid mutably, e.g. to seed it.
    pub fn current_grid_mut(&mut self) -> &mut Grid {
        &mut self.current
    }

    /// Returns the next grid.
    ///
    /// After a failed step its contents are partial and must not be used.
    pub fn next_grid(&self) -> &Grid {
        &self.next
    }

    fn check_size(&self, grid: &Grid) -> Result<(), AutomatonError> {
        if grid.width() != self.width() || grid.height() != self.height() {
            return Err(AutomatonError::GridSizeMismatch {
                width: self.width(),
                height: self.height(),
                got_width: grid.width(),
                got_height: grid.height(),
            });
        }
        Ok(())
    }

    /// Replaces the current grid.
    pub fn set_current_grid(&mut self, grid: Grid) -> Result<(), AutomatonError> {
        self.check_size(&grid)?;
        self.current = grid;
        Ok(())
    }

    /// Replaces the next grid.
    pub fn set_next_grid(&mut self, grid: Grid) -> Result<(), AutomatonError> {
        self.check_size(&grid)?;
        self.next = grid;
        Ok(())
    }

    /// Swaps the current and next grids. Border contents travel with their
    /// grid, so a topology must be reapplied to the new current grid.
    pub fn swap_grids(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
        debug!(generation = self.generation, "swapped grids");
    }

    /// Returns the rules in priority order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    fn check_rule(&self, rule: &Rule) -> Result<(), AutomatonError> {
        if rule.num_states() != self.num_states {
            return Err(AutomatonError::RuleStateMismatch {
                condition: rule.condition().to_string(),
                expected: self.num_states,
                got: rule.num_states(),
            });
        }
        if usize::from(rule.target_state()) >= self.num_states {
            return Err(AutomatonError::TargetStateOutOfRange {
                condition: rule.condition().to_string(),
                target: rule.target_state(),
                num_states: self.num_states,
            });
        }
        Ok(())
    }

    /// Replaces the rules. The first rule whose condition holds wins.
    pub fn set_rules(&mut self, rules: Vec<Rule>) -> Result<(), AutomatonError> {
        for rule in &rules {
            self.check_rule(rule)?;
        }
        self.rules = rules;
        Ok(())
    }

    /// Appends a rule with the lowest priority.
    pub fn push_rule(&mut self, rule: Rule) -> Result<(), AutomatonError> {
        self.check_rule(&rule)?;
        self.rules.push(rule);
        Ok(())
    }

    /// Fills the current grid's border ring as a torus.
    pub fn set_borders_toroidal(&mut self) {
        self.current.set_toroidal_borders();
    }

    /// Applies the configured [`Boundary`] to the current grid.
    pub fn apply_boundary(&mut self) {
        match self.boundary {
            Boundary::Fixed => {}
            Boundary::Toroidal => self.current.set_toroidal_borders(),
            Boundary::Constant(state) => self.current.set_constant_borders(state),
        }
    }

    fn check_states(&self) -> Result<(), AutomatonError> {
        for y in 0..self.height() {
            if let Some(x) = self
                .current
                .row(y)
                .iter()
                .position(|&c| usize::from(c) >= self.num_states)
            {
                return Err(AutomatonError::StateOutOfRange {
                    x,
                    y,
                    state: self.current.get(x, y),
                    num_states: self.num_states,
                });
            }
        }
        Ok(())
    }

    /// Computes the next generation into the next grid.
    ///
    /// Each cell takes the target of the first rule whose condition holds
    /// for its neighbourhood, or keeps its state if none does. On error the
    /// pass stops immediately, the generation counter is left unchanged and
    /// the next grid must be discarded.
    pub fn step(&mut self) -> Result<(), AutomatonError> {
        self.check_states()?;
        for y in 0..self.current.height() {
            for x in 0..self.current.width() {
                let state = resolve_cell(&mut self.rules, &self.current, x, y)
                    .inspect_err(|e| warn!(error = %e, "step aborted"))?;
                self.next.set(x, y, state);
            }
        }
        self.generation += 1;
        debug!(generation = self.generation, "step complete");
        Ok(())
    }

    /// Same as [`Automaton::step`], with rows spread across the rayon pool.
    ///
    /// Each worker evaluates with its own clone of the rules. The next grid is
    /// written only after every row has resolved, so a failed pass leaves it
    /// untouched; it must still be treated as stale.
    #[cfg(feature = "parallel")]
    pub fn step_parallel(&mut self) -> Result<(), AutomatonError> {
        use rayon::prelude::*;

        self.check_states()?;
        let current = &self.current;
        let rules = &self.rules;
        let rows: Vec<Vec<Cell>> = (0..current.height())
            .into_par_iter()
            .map_init(
                || rules.clone(),
                |rules, y| {
                    (0..current.width())
                        .map(|x| resolve_cell(rules, current, x, y))
                        .collect::<Result<Vec<_>, _>>()
                },
            )
            .collect::<Result<_, _>>()
            .inspect_err(|e| warn!(error = %e, "parallel step aborted"))?;

        for (y, row) in rows.iter().enumerate() {
            for (x, &state) in row.iter().enumerate() {
                self.next.set(x, y, state);
            }
        }
        self.generation += 1;
        debug!(generation = self.generation, "parallel step complete");
        Ok(())
    }

    /// Runs `generations` full cycles: apply the boundary, step, swap.
    ///
    /// Stops at the first failing generation; completed generations are kept.
    pub fn run(&mut self, generations: usize) -> Result<(), AutomatonError> {
        for _ in 0..generations {
            self.apply_boundary();
            self.step()?;
            self.swap_grids();
        }
        Ok(())
    }

    /// Recounts how many cells of the current grid hold each state.
    ///
    /// Never runs implicitly and never reads the next grid. Values outside
    /// `[0, num_states)` are not counted.
    pub fn count_cells_per_state(&mut self) -> &[usize] {
        self.cells_per_state.fill(0);
        for state in self.current.cells() {
            if let Some(n) = self.cells_per_state.get_mut(usize::from(state)) {
                *n += 1;
            }
        }
        &self.cells_per_state
    }

    /// Returns the counts from the last [`Automaton::count_cells_per_state`].
    pub fn cells_per_state(&self) -> &[usize] {
        &self.cells_per_state
    }
}

/// First-match-wins resolution of one cell, falling back to its own state.
fn resolve_cell(
    rules: &mut [Rule],
    grid: &Grid,
    x: usize,
    y: usize,
) -> Result<Cell, AutomatonError> {
    let window = grid.neighbourhood(x, y);
    for (i, rule) in rules.iter_mut().enumerate() {
        let matched = rule
            .matches(&window)
            .map_err(|e| AutomatonError::StepFailed {
                x,
                y,
                rule: i,
                source: Box::new(e),
            })?;
        if matched {
            return Ok(rule.target_state());
        }
    }
    Ok(window[1][1])
}
