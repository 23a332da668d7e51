use anyhow::Result;
use pii_security::{Redactor, RuleSet};

pub fn handle(rules: &RuleSet, json: bool) -> Result<()> {
    if json {
        println!("{}", rules.to_json_pretty()?);
        return Ok(());
    }

    let redactor = Redactor::with_custom(&rules.text_patterns)?;

    println!("Free-text patterns:");
    for name in redactor.pattern_names() {
        println!("  {}", name);
    }

    println!("Field rules:");
    if rules.standalone_pii_patterns.is_empty() {
        println!("  (none)");
    }
    for (key, rule) in &rules.standalone_pii_patterns {
        println!(
            "  {:<14} score {:<4} {:<13} /{}/",
            key,
            rule.base_score,
            rule.redactor.name(),
            rule.regex
        );
    }

    println!("Combination rules:");
    if rules.combinatorial_pii_sets.is_empty() {
        println!("  (none)");
    }
    for (name, rule) in &rules.combinatorial_pii_sets {
        println!(
            "  {:<14} score {:<4} keys: {}",
            name,
            rule.base_score,
            rule.keys.join(", ")
        );
    }

    if !rules.redaction_placeholders.is_empty() {
        println!("Placeholders:");
        for (key, placeholder) in &rules.redaction_placeholders {
            println!("  {:<14} {}", key, placeholder);
        }
    }

    Ok(())
}
