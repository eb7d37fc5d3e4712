//! Execution of Chef recipes.
use indexmap::IndexMap;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace};

use crate::ops::Op;
use crate::parser::{self, Ingredient, Measure, ParseError, Program};

#[cfg(test)]
mod tests;

/// A single value held by a mixing bowl or baking dish.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cell {
    pub value: i64,
    pub measure: Measure,
}

/// An error that can occur while executing a single recipe statement.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum OperationError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Unknown ingredient: `{0}`.")]
    UnknownIngredient(String),
    #[error("Ingredient `{0}` has no value.")]
    UndefinedIngredient(String),
    #[error("Mixing bowl {bowl} is empty.")]
    EmptyBowl { bowl: usize },
    #[error("Serving requires {required} baking dishes, only {available} prepared.")]
    NotEnoughDishes { required: usize, available: usize },
    #[error("Integer overflow")]
    IntegerOverflow,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Value {0} is not a valid character.")]
    InvalidCharacter(i64),
    #[error("Loop has no matching `until` statement.")]
    UnmatchedLoop,
    #[error("No auxiliary recipe titled `{0}`.")]
    UnknownRecipe(String),
    #[error("Sous-chef recursion exceeded {limit} nested recipes.")]
    TooManySousChefs { limit: usize },
    #[error("Sous-chef failed: {0}")]
    SousChef(Box<RunError>),
}

/// An error that happened while executing a Chef recipe.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RunError {
    /// A specific statement failed.
    #[error("Statement {index} (`{statement}`) failed: {error}")]
    StatementFailed {
        /// The text of the statement which failed.
        statement: String,
        /// The 1-based index of this statement in the normalized recipe.
        index: usize,
        /// The specific error within the statement.
        error: OperationError,
    },
    /// The recipe executed more statements than allowed by [`Options`].
    #[error("The recipe ran for too long ({statements_run} statements had been executed).")]
    RunTooLong { statements_run: u64 },
}

/// Options for recipe execution.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// Maximum nesting depth of `Serve with` invocations. Exceeding it is
    /// fatal; recursive recipes would otherwise overflow the real stack.
    pub max_sous_chef_depth: usize,
    /// The maximum number of statements to execute, shared with sous-chef
    /// recipes. If this is reached, the recipe stops with an error.
    ///
    /// Set to [`u64::MAX`] to disable this limit.
    pub max_statements: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self { max_sous_chef_depth: 64, max_statements: u64::MAX }
    }
}

/// One entry of the loop stack, recording a `Verb … until verbed` pair.
#[derive(Clone, Debug)]
struct LoopFrame {
    /// Statement index of the loop header.
    start: usize,
    /// Statement index of the matching `until` statement.
    end: usize,
    /// Ingredient whose value keeps the loop running while positive.
    guard: String,
    /// Ingredient named in the `until` clause; the guard stands in when the
    /// clause names none.
    decrement: Option<String>,
    /// Set by `Set aside`; the next head-of-loop check exits the frame.
    force_exit: bool,
}

/// Which recipe section the statement walk is currently inside.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Section {
    DiscoveringTitle,
    ReadingIngredients,
    IngredientsComplete,
    ReadingInstructions,
    Serving,
}

/// The mutable cooking state of one recipe invocation. Sous-chef calls get
/// their own `Kitchen` over the same program.
struct Kitchen<'a> {
    program: &'a Program,
    options: Options,
    title: Option<String>,
    ingredients: IndexMap<String, Ingredient>,
    bowls: Vec<Vec<Cell>>,
    dishes: Vec<Vec<Cell>>,
    output: Vec<String>,
    loops: SmallVec<[LoopFrame; 4]>,
    pc: usize,
    section: Section,
    exit: bool,
    depth: usize,
    statements_run: u64,
}

/// Runs a Chef recipe and returns its dishes, one string per diner.
///
/// # Example
/// ```
/// let recipe = "\
/// Hello World Souffle.
///
/// Ingredients.
/// 72 g haricot beans
/// 105 ml ice water
///
/// Method.
/// Put haricot beans into the mixing bowl. Put ice water into the mixing bowl.
/// Liquefy contents of the mixing bowl.
/// Pour contents of the mixing bowl into the baking dish.
///
/// Serves 1.
/// ";
///
/// assert_eq!(chef::execute(recipe).unwrap(), vec!["iH"]);
/// ```
pub fn execute(source: &str) -> Result<Vec<String>, RunError> {
    execute_with_options(source, Options::default())
}

/// Runs a Chef recipe with the given options. See [`execute`].
pub fn execute_with_options(source: &str, options: Options) -> Result<Vec<String>, RunError> {
    let program = Program::load(source);
    let mut kitchen = Kitchen::new(&program, options);
    kitchen.run()?;
    Ok(kitchen.output)
}

impl<'a> Kitchen<'a> {
    fn new(program: &'a Program, options: Options) -> Self {
        Kitchen {
            program,
            options,
            title: None,
            ingredients: IndexMap::new(),
            bowls: Vec::new(),
            dishes: Vec::new(),
            output: Vec::new(),
            loops: SmallVec::new(),
            pc: 0,
            section: Section::DiscoveringTitle,
            exit: false,
            depth: 0,
            statements_run: 0,
        }
    }

    /// Walks the program counter until the recipe exits or the statement
    /// list runs out. The loop stack is consulted at the head of every
    /// iteration, before the current statement is dispatched.
    fn run(&mut self) -> Result<(), RunError> {
        let program = self.program;
        while self.pc < program.statements.len() && !self.exit {
            if self.statements_run >= self.options.max_statements {
                return Err(RunError::RunTooLong { statements_run: self.statements_run });
            }
            if let Some(frame) = self.loops.last() {
                if frame.force_exit {
                    self.pc = frame.end + 1;
                    self.loops.pop();
                    continue;
                }
                if self.pc == frame.end {
                    let frame = frame.clone();
                    match self.evaluate_back_edge(&frame) {
                        Ok(true) => self.pc = frame.start + 1,
                        Ok(false) => {
                            trace!(end = frame.end, guard = frame.guard.as_str(), "loop finished");
                            self.pc = frame.end + 1;
                            self.loops.pop();
                        }
                        Err(error) => return Err(self.fail(frame.end, error)),
                    }
                    self.statements_run += 1;
                    continue;
                }
            }
            let pc = self.pc;
            let statement = program.statements[pc].as_str();
            trace!(pc, statement, "dispatch");
            if let Err(error) = self.step(statement) {
                return Err(self.fail(pc, error));
            }
            self.pc += 1;
            self.statements_run += 1;
        }
        if !self.exit {
            // The walk ran out of statements without a `Serves` line or a
            // `Refrigerate`; the recipe never closed its sections.
            let marker = match self.section {
                Section::ReadingInstructions | Section::Serving => "Serves",
                _ => "Method",
            };
            let index = program.statements.len().saturating_sub(1);
            return Err(self.fail(index, ParseError::MissingSection(marker).into()));
        }
        Ok(())
    }

    fn fail(&self, index: usize, error: OperationError) -> RunError {
        RunError::StatementFailed {
            statement: self.program.statements[index].clone(),
            index: index + 1,
            error,
        }
    }

    /// Runs the decrement-and-test at a loop's `until` statement. Returns
    /// whether the loop should run another pass.
    fn evaluate_back_edge(&mut self, frame: &LoopFrame) -> Result<bool, OperationError> {
        let target = frame.decrement.as_deref().unwrap_or(&frame.guard);
        let value = self.ingredient_value(target)?;
        let decremented = value.checked_sub(1).ok_or(OperationError::IntegerOverflow)?;
        self.set_ingredient_value(target, decremented)?;
        Ok(self.ingredient_value(&frame.guard)? > 0)
    }

    /// Advances the section state machine by one statement, dispatching
    /// method statements through the operator decoder.
    fn step(&mut self, statement: &str) -> Result<(), OperationError> {
        match self.section {
            Section::DiscoveringTitle => {
                if statement == "Ingredients" {
                    debug!(title = self.title.as_deref().unwrap_or(""), "cooking");
                    self.section = Section::ReadingIngredients;
                } else if !statement.is_empty() {
                    self.title = Some(statement.to_string());
                }
                Ok(())
            }
            Section::ReadingIngredients => {
                if statement.is_empty() {
                    self.section = Section::IngredientsComplete;
                } else {
                    let (name, ingredient) = parser::parse_ingredient(statement)?;
                    self.ingredients.insert(name, ingredient);
                }
                Ok(())
            }
            Section::IngredientsComplete => {
                // `Cooking time:` and `Pre-heat oven …` lines sit here and
                // carry no semantics.
                if statement == "Method" {
                    self.section = Section::ReadingInstructions;
                }
                Ok(())
            }
            Section::ReadingInstructions => {
                if statement.is_empty() {
                    self.section = Section::Serving;
                    return Ok(());
                }
                let op = parser::decode(statement)?;
                self.apply(op)
            }
            Section::Serving => {
                if let Some(count) = statement.strip_prefix("Serves ") {
                    let diners: usize = count
                        .trim()
                        .parse()
                        .map_err(|_| ParseError::MalformedStatement(statement.to_string()))?;
                    self.prepare_dishes(diners)?;
                    self.exit = true;
                }
                Ok(())
            }
        }
    }

    fn apply(&mut self, op: Op) -> Result<(), OperationError> {
        match op {
            Op::Put { ingredient, bowl } => {
                let cell = self.ingredient_cell(&ingredient)?;
                self.bowl_mut(bowl).push(cell);
            }
            Op::Fold { ingredient, bowl } => {
                let cell = self.pop_bowl(bowl)?;
                let entry = self
                    .ingredients
                    .get_mut(&ingredient)
                    .ok_or(OperationError::UnknownIngredient(ingredient))?;
                entry.value = Some(cell.value);
                entry.measure = cell.measure;
            }
            Op::Add { ingredient, bowl } => {
                self.arithmetic(bowl, &ingredient, i64::checked_add)?;
            }
            Op::Remove { ingredient, bowl } => {
                self.arithmetic(bowl, &ingredient, i64::checked_sub)?;
            }
            Op::Combine { ingredient, bowl } => {
                self.arithmetic(bowl, &ingredient, i64::checked_mul)?;
            }
            Op::Divide { ingredient, bowl } => {
                // Truncating integer division, rounded toward zero.
                let operand = self.ingredient_value(&ingredient)?;
                let top = self.top_mut(bowl)?;
                top.value = top.value.checked_div(operand).ok_or(if operand == 0 {
                    OperationError::DivisionByZero
                } else {
                    OperationError::IntegerOverflow
                })?;
            }
            Op::AddDryIngredients { bowl } => {
                let mut sum: i64 = 0;
                // Declaration order, so the sum is reproducible.
                for (name, ingredient) in &self.ingredients {
                    if ingredient.measure == Measure::Dry {
                        let value = ingredient
                            .value
                            .ok_or_else(|| OperationError::UndefinedIngredient(name.clone()))?;
                        sum = sum.checked_add(value).ok_or(OperationError::IntegerOverflow)?;
                    }
                }
                self.bowl_mut(bowl).push(Cell { value: sum, measure: Measure::Unspecified });
            }
            Op::Liquefy { bowl } => {
                for cell in self.bowl_mut(bowl) {
                    cell.measure = Measure::Liquid;
                }
            }
            Op::StirMinutes { bowl, minutes } => self.stir(bowl, minutes)?,
            Op::StirIngredient { ingredient, bowl } => {
                let minutes = self.ingredient_value(&ingredient)?;
                self.stir(bowl, minutes)?;
            }
            Op::Clean { bowl } => self.bowl_mut(bowl).clear(),
            Op::Pour { bowl, dish } => {
                // The bowl keeps its contents; only the dish grows.
                let cells = self.bowl_mut(bowl).clone();
                if cells.is_empty() {
                    return Err(OperationError::EmptyBowl { bowl });
                }
                self.dish_mut(dish).extend(cells);
            }
            Op::SetAside => {
                if let Some(frame) = self.loops.last_mut() {
                    frame.force_exit = true;
                }
            }
            Op::ServeWith { title } => self.sous_chef(&title)?,
            Op::Refrigerate { hours } => {
                if let Some(hours) = hours {
                    self.prepare_dishes(hours)?;
                }
                self.exit = true;
            }
            Op::StartLoop { guard } => {
                let end = self.find_loop_end()?;
                let decrement = parser::until_ingredient(&self.program.statements[end]);
                trace!(start = self.pc, end, guard = guard.as_str(), "entering loop");
                self.loops.push(LoopFrame {
                    start: self.pc,
                    end,
                    guard,
                    decrement,
                    force_exit: false,
                });
            }
        }
        Ok(())
    }

    /// Locates the `until` statement closing the loop whose header is the
    /// current statement. Headers opened in between close against their own
    /// `until` first, so nested loops pair lexically. The scan stops at the
    /// end of the method section.
    fn find_loop_end(&self) -> Result<usize, OperationError> {
        let mut depth = 0usize;
        for (index, statement) in self.program.statements.iter().enumerate().skip(self.pc + 1) {
            if statement.is_empty() {
                break;
            }
            if statement.contains(" until ") {
                if depth == 0 {
                    return Ok(index);
                }
                depth -= 1;
            } else if parser::is_loop_header(statement) {
                depth += 1;
            }
        }
        Err(OperationError::UnmatchedLoop)
    }

    /// Runs the auxiliary recipe titled `title` on a copy of the current
    /// bowls and dishes, then appends its first bowl onto ours.
    fn sous_chef(&mut self, title: &str) -> Result<(), OperationError> {
        if self.depth >= self.options.max_sous_chef_depth {
            return Err(OperationError::TooManySousChefs {
                limit: self.options.max_sous_chef_depth,
            });
        }
        let start = self
            .program
            .title_index(title)
            .ok_or_else(|| OperationError::UnknownRecipe(title.to_string()))?;
        debug!(title, start, "calling sous-chef");
        let mut sous = Kitchen {
            program: self.program,
            options: self.options,
            title: None,
            ingredients: IndexMap::new(),
            bowls: self.bowls.clone(),
            dishes: self.dishes.clone(),
            output: Vec::new(),
            loops: SmallVec::new(),
            pc: start,
            section: Section::DiscoveringTitle,
            exit: false,
            depth: self.depth + 1,
            statements_run: self.statements_run,
        };
        let result = sous.run();
        self.statements_run = sous.statements_run;
        if let Err(error) = &result {
            debug!(title, %error, "sous-chef failed");
        }
        result.map_err(|error| OperationError::SousChef(Box::new(error)))?;
        let returned = sous.bowls.into_iter().next().unwrap_or_default();
        debug!(title, cells = returned.len(), "sous-chef returned");
        self.bowl_mut(1).extend(returned);
        Ok(())
    }

    /// Drains the first `count` baking dishes into the diner output, top
    /// cell first. Liquid cells render as characters, everything else as
    /// decimal integers.
    fn prepare_dishes(&mut self, count: usize) -> Result<(), OperationError> {
        if self.dishes.len() < count {
            return Err(OperationError::NotEnoughDishes {
                required: count,
                available: self.dishes.len(),
            });
        }
        for dish in &mut self.dishes[..count] {
            let mut serving = String::new();
            while let Some(cell) = dish.pop() {
                match cell.measure {
                    Measure::Liquid => {
                        let c = u32::try_from(cell.value)
                            .ok()
                            .and_then(char::from_u32)
                            .ok_or(OperationError::InvalidCharacter(cell.value))?;
                        serving.push(c);
                    }
                    Measure::Dry | Measure::Unspecified => {
                        serving.push_str(&cell.value.to_string());
                    }
                }
            }
            debug!(dish = serving.as_str(), "served");
            self.output.push(serving);
        }
        Ok(())
    }

    /// Rolls the top cell of a bowl down by `minutes` positions, capped at
    /// the bottom of the bowl.
    fn stir(&mut self, bowl: usize, minutes: i64) -> Result<(), OperationError> {
        let cells = self.bowl_mut(bowl);
        let top = cells.pop().ok_or(OperationError::EmptyBowl { bowl })?;
        let index = cells.len().saturating_sub(minutes.max(0) as usize);
        cells.insert(index, top);
        Ok(())
    }

    /// Applies a checked binary operator to the top cell of a bowl, with
    /// the ingredient's value as the right-hand operand.
    fn arithmetic(
        &mut self,
        bowl: usize,
        ingredient: &str,
        op: fn(i64, i64) -> Option<i64>,
    ) -> Result<(), OperationError> {
        let operand = self.ingredient_value(ingredient)?;
        let top = self.top_mut(bowl)?;
        top.value = op(top.value, operand).ok_or(OperationError::IntegerOverflow)?;
        Ok(())
    }

    fn ingredient(&self, name: &str) -> Result<&Ingredient, OperationError> {
        self.ingredients
            .get(name)
            .ok_or_else(|| OperationError::UnknownIngredient(name.to_string()))
    }

    fn ingredient_value(&self, name: &str) -> Result<i64, OperationError> {
        self.ingredient(name)?
            .value
            .ok_or_else(|| OperationError::UndefinedIngredient(name.to_string()))
    }

    fn ingredient_cell(&self, name: &str) -> Result<Cell, OperationError> {
        let ingredient = self.ingredient(name)?;
        let value = ingredient
            .value
            .ok_or_else(|| OperationError::UndefinedIngredient(name.to_string()))?;
        Ok(Cell { value, measure: ingredient.measure })
    }

    fn set_ingredient_value(&mut self, name: &str, value: i64) -> Result<(), OperationError> {
        let entry = self
            .ingredients
            .get_mut(name)
            .ok_or_else(|| OperationError::UnknownIngredient(name.to_string()))?;
        entry.value = Some(value);
        Ok(())
    }

    fn pop_bowl(&mut self, bowl: usize) -> Result<Cell, OperationError> {
        self.bowl_mut(bowl).pop().ok_or(OperationError::EmptyBowl { bowl })
    }

    fn top_mut(&mut self, bowl: usize) -> Result<&mut Cell, OperationError> {
        self.bowl_mut(bowl).last_mut().ok_or(OperationError::EmptyBowl { bowl })
    }

    fn bowl_mut(&mut self, bowl: usize) -> &mut Vec<Cell> {
        Self::container_mut(&mut self.bowls, bowl)
    }

    fn dish_mut(&mut self, dish: usize) -> &mut Vec<Cell> {
        Self::container_mut(&mut self.dishes, dish)
    }

    /// Bowls and dishes are 1-based in source and 0-based in storage, and
    /// are allocated lazily on first use.
    fn container_mut(containers: &mut Vec<Vec<Cell>>, index: usize) -> &mut Vec<Cell> {
        let offset = index - 1;
        if containers.len() <= offset {
            containers.resize_with(offset + 1, Vec::new);
        }
        &mut containers[offset]
    }
}
