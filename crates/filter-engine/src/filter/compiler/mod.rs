//! Compiles a filter tree into a single predicate.
//!
//! Each group folds its children's predicates with its own combinator; nested
//! groups are compiled first and contribute one predicate to their parent.
//! Empty groups contribute nothing, so a tree without leaves compiles to the
//! identity predicate.

use crate::{
    dates::validate_financial_month,
    error::Result,
    filter::{
        field::{FieldResolver, PATH_SEPARATOR, ResolvedField},
        period::PeriodData,
        predicate::Predicate,
        tree::{Combinator, FilterGroup, FilterNode},
    },
};
use chrono::{Local, NaiveDate};
use model::core::value::Value;
use planner::query::ast::expr::Expr;
use serde::Serialize;
use tracing::debug;

mod leaf;

/// Everything a compilation depends on besides the tree itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileContext {
    today: NaiveDate,
    financial_year_start_month: u32,
    current_user: Option<Value>,
}

impl CompileContext {
    pub fn new(today: NaiveDate, financial_year_start_month: u32) -> Result<Self> {
        Ok(CompileContext {
            today,
            financial_year_start_month: validate_financial_month(financial_year_start_month)?,
            current_user: None,
        })
    }

    /// A context for the local date.
    pub fn local(financial_year_start_month: u32) -> Result<Self> {
        CompileContext::new(Local::now().date_naive(), financial_year_start_month)
    }

    /// Identity of the authenticated user, compared against by logged in user leaves.
    pub fn with_current_user(mut self, user: Value) -> Self {
        self.current_user = Some(user);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn financial_year_start_month(&self) -> u32 {
        self.financial_year_start_month
    }

    pub fn current_user(&self) -> Option<&Value> {
        self.current_user.as_ref()
    }
}

/// The compiled predicate and the date period its leaves cover.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledFilter {
    pub predicate: Predicate,
    pub period: PeriodData,
}

pub struct FilterCompiler<'a> {
    resolver: &'a dyn FieldResolver,
    ctx: &'a CompileContext,
    prefix: Option<String>,
    extra_tree: Option<&'a FilterGroup>,
    extra_predicate: Option<Expr>,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(resolver: &'a dyn FieldResolver, ctx: &'a CompileContext) -> Self {
        FilterCompiler {
            resolver,
            ctx,
            prefix: None,
            extra_tree: None,
            extra_predicate: None,
        }
    }

    /// Resolves every field path as `<prefix>__<field>`, for filters scoped to
    /// a related table.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// A second, caller-owned tree (e.g. a dashboard filter) that is
    /// AND-combined with the main one.
    pub fn with_extra_tree(mut self, tree: &'a FilterGroup) -> Self {
        self.extra_tree = Some(tree);
        self
    }

    /// A scoping condition that is always AND-combined with the result,
    /// whatever the tree's own combinator.
    pub fn with_extra_predicate(mut self, predicate: Expr) -> Self {
        self.extra_predicate = Some(predicate);
        self
    }

    pub fn compile(&self, tree: Option<&FilterGroup>) -> Result<CompiledFilter> {
        let mut period = PeriodData::default();

        let mut predicate = Predicate::identity();
        if let Some(tree) = tree {
            predicate = Predicate::from(self.compile_group(tree, &mut period)?);
        }
        if let Some(extra_tree) = self.extra_tree {
            predicate = predicate.and(Predicate::from(self.compile_group(extra_tree, &mut period)?));
        }
        if let Some(extra) = &self.extra_predicate {
            predicate = predicate.and(Predicate::new(extra.clone()));
        }

        debug!(
            "Compiled filter (identity: {}, period: {:?})",
            predicate.is_identity(),
            period.date_range()
        );
        Ok(CompiledFilter { predicate, period })
    }

    fn compile_group(&self, group: &FilterGroup, period: &mut PeriodData) -> Result<Option<Expr>> {
        debug!(
            "Compiling {} group with {} children",
            group.combinator,
            group.children.len()
        );

        let mut predicates = Vec::with_capacity(group.children.len());
        for child in &group.children {
            match child {
                FilterNode::Group(nested) => {
                    if let Some(expr) = self.compile_group(nested, period)? {
                        predicates.push(expr);
                    }
                }
                FilterNode::Leaf(leaf) => predicates.push(self.compile_leaf(leaf, group, period)?),
            }
        }

        Ok(match group.combinator {
            Combinator::And => Expr::conjunction(predicates),
            Combinator::Or => Expr::disjunction(predicates),
        })
    }

    fn resolve_field(&self, path: &str) -> Result<ResolvedField> {
        let full_path = match &self.prefix {
            Some(prefix) => format!("{prefix}{PATH_SEPARATOR}{path}"),
            None => path.to_string(),
        };
        Ok(self.resolver.resolve(&full_path)?)
    }
}

/// Compiles `tree` with an optional scoping predicate and field prefix.
pub fn compile(
    tree: Option<&FilterGroup>,
    resolver: &dyn FieldResolver,
    ctx: &CompileContext,
    extra_predicate: Option<Expr>,
    field_prefix: Option<&str>,
) -> Result<CompiledFilter> {
    let mut compiler = FilterCompiler::new(resolver, ctx);
    if let Some(prefix) = field_prefix {
        compiler = compiler.with_prefix(prefix);
    }
    if let Some(extra) = extra_predicate {
        compiler = compiler.with_extra_predicate(extra);
    }
    compiler.compile(tree)
}

#[cfg(test)]
mod tests;
