/// A single decoded method statement.
///
/// Bowl and dish indices are 1-based, exactly as they read in the recipe
/// (`1st mixing bowl`); the kitchen converts them to storage offsets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Op {
    /// `Put <ingredient> into [the] [<ordinal>] mixing bowl`
    Put { ingredient: String, bowl: usize },
    /// `Fold <ingredient> into [the] [<ordinal>] mixing bowl`
    Fold { ingredient: String, bowl: usize },
    /// `Add <ingredient> [to [the] [<ordinal>] mixing bowl]`
    Add { ingredient: String, bowl: usize },
    /// `Add dry ingredients [to [the] [<ordinal>] mixing bowl]`
    AddDryIngredients { bowl: usize },
    /// `Remove <ingredient> [from [the] [<ordinal>] mixing bowl]`
    Remove { ingredient: String, bowl: usize },
    /// `Combine <ingredient> [into [the] [<ordinal>] mixing bowl]`
    Combine { ingredient: String, bowl: usize },
    /// `Divide <ingredient> [into [the] [<ordinal>] mixing bowl]`
    Divide { ingredient: String, bowl: usize },
    /// `Liquefy contents of the [<ordinal>] mixing bowl`, or the
    /// single-ingredient form, which targets the same bowl.
    Liquefy { bowl: usize },
    /// `Stir [the [<ordinal>] mixing bowl] for <N> minutes`
    StirMinutes { bowl: usize, minutes: i64 },
    /// `Stir <ingredient> into the [<ordinal>] mixing bowl`
    StirIngredient { ingredient: String, bowl: usize },
    /// `Clean [the] [<ordinal>] mixing bowl`
    Clean { bowl: usize },
    /// `Pour contents of the [<ordinal>] mixing bowl into the [<ordinal>]
    /// baking dish`
    Pour { bowl: usize, dish: usize },
    /// `Set aside`
    SetAside,
    /// `Serve with <auxiliary recipe title>`
    ServeWith { title: String },
    /// `Refrigerate [for <N> hours]`
    Refrigerate { hours: Option<usize> },
    /// Any other leading verb opens a loop: `<Verb> the <ingredient>`.
    StartLoop { guard: String },
}
