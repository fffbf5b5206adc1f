use anyhow::Result;

use futarchy_stage::{ActionDefinition, Context, PackageId, TypeTag, registry};

use crate::cli::ActionsCommand;

/// Optional filters for `actions list`.
#[derive(Debug, Default)]
struct ListFilter {
    context: Option<Context>,
    package: Option<PackageId>,
    param_type: Option<TypeTag>,
}

impl ListFilter {
    fn parse(
        context: Option<&str>,
        package: Option<&str>,
        param_type: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            context: context.map(str::parse::<Context>).transpose()?,
            package: package.map(str::parse::<PackageId>).transpose()?,
            param_type: param_type.map(TypeTag::from_atom).transpose()?,
        })
    }

    fn matches(&self, action: &ActionDefinition) -> bool {
        self.context.is_none_or(|ctx| action.supports(ctx))
            && self.package.is_none_or(|pkg| action.package == pkg)
            && self
                .param_type
                .is_none_or(|ty| action.params.iter().any(|param| param.ty == ty))
    }
}

pub(crate) fn cmd_actions(command: ActionsCommand) -> Result<()> {
    match command {
        ActionsCommand::List {
            context,
            package,
            param_type,
        } => {
            let filter =
                ListFilter::parse(context.as_deref(), package.as_deref(), param_type.as_deref())?;
            let mut listed = 0usize;
            for action in registry().iter().filter(|action| filter.matches(action)) {
                println!(
                    "{:<30} {:<26} {:<19} {}",
                    action.id,
                    action.package.as_str(),
                    contexts_label(action),
                    action.description
                );
                listed += 1;
            }
            if listed == 0 {
                println!("no actions match");
            }
        }
        ActionsCommand::Show { id } => {
            let action = registry().get(&id)?;
            show_action(action);
        }
    }
    Ok(())
}

fn contexts_label(action: &ActionDefinition) -> String {
    action
        .contexts
        .iter()
        .map(|ctx| ctx.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn show_action(action: &ActionDefinition) {
    println!("{}", action.id);
    println!("  {}", action.description);
    println!(
        "  entry:    <{}>::{}::{}",
        action.package, action.staging_module, action.staging_function
    );
    println!("  contexts: {}", contexts_label(action));
    if !action.type_params.is_empty() {
        println!("  generics: <{}>", action.type_params.join(", "));
    }
    if action.params.is_empty() {
        println!("  params:   (builder only)");
        return;
    }
    println!("  params:");
    for param in action.params {
        let marker = if param.optional { " (optional)" } else { "" };
        println!("    {}: {}{marker}", param.name, param.ty);
    }
}
