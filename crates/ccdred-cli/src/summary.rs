use ccdred_core::pipeline::config::ReductionConfig;
use ccdred_core::pipeline::ReductionSummary;
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_summary(config: &ReductionConfig, has_cleaner: bool) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("CCD Reduction"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Data"),
        s.path.apply_to(config.data_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Object"),
        s.value.apply_to(&config.object)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Filters"),
        s.value.apply_to(config.filters.join(", "))
    );

    match config.reshape {
        Some([h, w]) => println!(
            "  {:<14}{}",
            s.label.apply_to("Reshape"),
            s.value.apply_to(format!("{h}x{w}"))
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Reshape"),
            s.disabled.apply_to("disabled")
        ),
    }

    if has_cleaner {
        let cr = &config.cosmic_ray;
        println!("  {}", s.header.apply_to("Cosmic rays"));
        println!(
            "    {:<12}{}",
            s.label.apply_to("Gain"),
            s.value.apply_to(cr.gain)
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Read noise"),
            s.value.apply_to(cr.readnoise)
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Sigclip"),
            s.value.apply_to(cr.sigclip)
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Sigfrac"),
            s.value.apply_to(cr.sigfrac)
        );
    } else {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Cosmic rays"),
            s.disabled.apply_to("no capability, pass-through")
        );
    }
    println!();
}

pub fn print_result_summary(summary: &ReductionSummary) {
    let s = Styles::new();

    println!();
    if let Some(ref bias) = summary.master_bias {
        println!(
            "  {:<18}{}",
            s.label.apply_to("Master bias"),
            s.path.apply_to(bias.display())
        );
    }
    for (filter, path) in &summary.flats {
        println!(
            "  {:<18}{}",
            s.label.apply_to(format!("Flat ({filter})")),
            s.path.apply_to(path.display())
        );
    }
    println!(
        "  {:<18}{}",
        s.label.apply_to("Bias-corrected"),
        s.value.apply_to(summary.bias_corrected.len())
    );
    println!(
        "  {:<18}{}",
        s.label.apply_to("Flat-corrected"),
        s.value.apply_to(summary.flat_corrected.len())
    );
    if !summary.reshaped.is_empty() {
        println!(
            "  {:<18}{}",
            s.label.apply_to("Reshaped"),
            s.value.apply_to(summary.reshaped.len())
        );
    }
    if !summary.cosmic_cleaned.is_empty() {
        println!(
            "  {:<18}{}",
            s.label.apply_to("Cosmic-cleaned"),
            s.value.apply_to(summary.cosmic_cleaned.len())
        );
    }
    println!(
        "  {:<18}{}",
        s.label.apply_to("Final products"),
        s.value.apply_to(summary.final_products().len())
    );
    println!();
}
