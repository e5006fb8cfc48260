//! CLI tool for deploying and interacting with the lending ledger.

use collateral_lending::lending::ledger::LendingLedger;
use odra::casper_types::{U256, U512};
use odra::host::{HostEnv, HostRef};
use odra::prelude::Address;
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};

/// Default annual interest rate (10%)
const DEFAULT_INTEREST_RATE_BPS: u32 = 1_000;

/// Default loan-to-value ceiling and liquidation line
const DEFAULT_LIQUIDATION_THRESHOLD_PERCENT: u8 = 75;

/// Deploys the LendingLedger contract.
pub struct LedgerDeployScript;

impl DeployScript for LedgerDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use collateral_lending::lending::ledger::LendingLedgerInitArgs;

        let _ledger = LendingLedger::load_or_deploy(
            &env,
            LendingLedgerInitArgs {
                interest_rate_bps: DEFAULT_INTEREST_RATE_BPS,
                liquidation_threshold_percent: DEFAULT_LIQUIDATION_THRESHOLD_PERCENT,
                liquidator: None,
            },
            container,
            400_000_000_000 // Gas limit for ledger deployment
        )?;

        Ok(())
    }
}

/// Scenario to fund the pool from the caller's account.
pub struct ProvideLiquidityScenario;

impl Scenario for ProvideLiquidityScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "amount",
                "Amount of motes to deposit into the pool",
                NamedCLType::U512,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let ledger = container.contract_ref::<LendingLedger>(env)?;
        let amount = args.get_single::<U512>("amount")?;

        env.set_gas(10_000_000_000);
        ledger.with_tokens(amount).try_provide_liquidity()?;

        let lender = env.caller();
        println!("Provided {} motes of liquidity", amount);
        println!("Lender balance: {}", ledger.lender_balance(lender));
        println!("Pool funds: {}", ledger.total_pool_funds());
        Ok(())
    }
}

impl ScenarioMetadata for ProvideLiquidityScenario {
    const NAME: &'static str = "provide-liquidity";
    const DESCRIPTION: &'static str = "Deposits motes into the lending pool";
}

/// Scenario to quote the amount a borrower must send to repay.
pub struct QuoteRepaymentScenario;

impl Scenario for QuoteRepaymentScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "borrower",
                "Address of the borrower",
                NamedCLType::Key,
            ),
            CommandArg::new(
                "as_of",
                "Quote timestamp in seconds since epoch",
                NamedCLType::U64,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let ledger = container.contract_ref::<LendingLedger>(env)?;
        let borrower = args.get_single::<Address>("borrower")?;
        let as_of = args.get_single::<u64>("as_of")?;

        let loan = ledger.get_loan_details(borrower);
        if !loan.active {
            println!("No active loan for {:?}", borrower);
            return Ok(());
        }

        let interest: U256 = ledger.try_get_current_interest(borrower, as_of)?;
        let quote: U256 = ledger.try_get_required_repayment_amount(borrower, as_of)?;
        println!("Principal: {}", loan.loan_amount);
        println!("Interest: {}", interest);
        println!("Required repayment (with one-minute buffer): {}", quote);
        Ok(())
    }
}

impl ScenarioMetadata for QuoteRepaymentScenario {
    const NAME: &'static str = "quote-repayment";
    const DESCRIPTION: &'static str = "Quotes principal, interest and required repayment for a loan";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the collateral lending ledger")
        // Deploy scripts
        .deploy(LedgerDeployScript)
        // Contract references
        .contract::<LendingLedger>()
        // Scenarios
        .scenario(ProvideLiquidityScenario)
        .scenario(QuoteRepaymentScenario)
        .build()
        .run();
}
