use anyhow::Context;

use filter_compiler::{
    Condition, Dialect, FilterCompiler, Group, GroupOp, Node, Operator, TypedValue,
};

/// 示例过滤树：人事部门中薪资高于 50000 或名字以 "Joh" 开头的员工
fn sample_filter() -> Result<Group, filter_compiler::FilterError> {
    let high_salary_or_john: Node = Group::ordered(
        GroupOp::Or,
        vec![
            Condition::new("salary", Operator::Gt, TypedValue::number(50000))?,
            Condition::new(
                "SUBSTR(first_name, 1, 3)",
                Operator::Eq,
                TypedValue::string("Joh"),
            )?,
        ],
    )
    .into();

    Ok(Group::ordered(
        GroupOp::And,
        vec![
            Condition::new("department", Operator::Eq, TypedValue::string("HR"))?.into(),
            high_salary_or_john,
        ],
    ))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("--- Filter Compiler: 过滤树到条件表达式 ---");

    // 优先使用JSON方言配置，失败时使用默认配置
    let dialect = Dialect::load_or_default("dialect.json");
    println!("\n[方言配置]:\n{:#?}", dialect);

    let filter = sample_filter().context("构建示例过滤树失败")?;
    println!("\n[过滤树]:\n{:#?}", filter);

    let compiler = FilterCompiler::new(dialect);
    let result = compiler
        .compile_with_report(&filter)
        .context("编译过滤树失败")?;

    println!("\n[生成的条件表达式]:\n{}", result.expression);

    if !result.rewrites.is_empty() {
        println!("\n[应用的改写]:");
        for rewrite in &result.rewrites {
            println!("• {:?}", rewrite);
        }
    }

    let select = compiler
        .compile_select("employees", &filter)
        .context("生成 SELECT 语句失败")?;
    println!("\n[SELECT 语句]:\n{}", select);

    Ok(())
}
