// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Contract interfaces for the Spindrift deployments.
//!
//! Interfaces are declared with alloy's `sol!` macro; everything the
//! orchestration layer submits travels as a pre-encoded [`ContractCall`],
//! so transport stays behind the wallet adapter and this module owns the
//! ABI surface alone.

use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
    sol_types::SolCall,
};
use serde::{Deserialize, Serialize};

sol! {
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
    }

    interface IBalanceManager {
        function deposit(address token, uint256 amount) external;
        function withdraw(address token, uint256 amount) external;
        function balanceOf(address account, address token) external view returns (uint256);
    }

    interface IRouter {
        function placeOrder(address market, uint8 side, uint256 price, uint256 quantity) external returns (uint256);
        function placeOrderWithDeposit(address market, uint8 side, uint256 price, uint256 quantity, address fundingToken, uint256 fundingAmount) external returns (uint256);
        function placeMarketOrder(address market, uint8 side, uint256 quantity) external returns (uint256);
        function placeMarketOrderWithDeposit(address market, uint8 side, uint256 quantity, address fundingToken, uint256 fundingAmount) external returns (uint256);
    }

    interface IPoolFactory {
        function createPool(address base, address quote, uint256 tickSize, uint256 lotSize) external returns (address);
    }

    interface IFaucet {
        function requestToken(address token) external;
    }
}

/// Order side as encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Wire encoding used by the router (0 = buy, 1 = sell).
    pub fn code(&self) -> u8 {
        match self {
            OrderSide::Buy => 0,
            OrderSide::Sell => 1,
        }
    }
}

/// A fully encoded contract call, ready for submission.
///
/// `function` is the human-readable name, kept for logs and error
/// aggregation only; the calldata is authoritative.
#[derive(Debug, Clone)]
pub struct ContractCall {
    /// Target contract
    pub to: Address,
    /// ABI-encoded calldata
    pub data: Bytes,
    /// Function name for diagnostics
    pub function: &'static str,
}

impl ContractCall {
    fn new(to: Address, function: &'static str, data: Vec<u8>) -> Self {
        Self {
            to,
            data: data.into(),
            function,
        }
    }

    /// `IERC20.approve(spender, amount)` on `token`.
    pub fn approve(token: Address, spender: Address, amount: U256) -> Self {
        let call = IERC20::approveCall { spender, amount };
        Self::new(token, "approve", call.abi_encode())
    }

    /// `IBalanceManager.deposit(token, amount)`.
    pub fn deposit(balance_manager: Address, token: Address, amount: U256) -> Self {
        let call = IBalanceManager::depositCall { token, amount };
        Self::new(balance_manager, "deposit", call.abi_encode())
    }

    /// `IBalanceManager.withdraw(token, amount)`.
    pub fn withdraw(balance_manager: Address, token: Address, amount: U256) -> Self {
        let call = IBalanceManager::withdrawCall { token, amount };
        Self::new(balance_manager, "withdraw", call.abi_encode())
    }

    /// `IRouter.placeOrder(market, side, price, quantity)` funded from custody.
    pub fn place_order(
        router: Address,
        market: Address,
        side: OrderSide,
        price: U256,
        quantity: U256,
    ) -> Self {
        let call = IRouter::placeOrderCall {
            market,
            side: side.code(),
            price,
            quantity,
        };
        Self::new(router, "placeOrder", call.abi_encode())
    }

    /// `IRouter.placeOrderWithDeposit(...)` funded from the wallet.
    pub fn place_order_with_deposit(
        router: Address,
        market: Address,
        side: OrderSide,
        price: U256,
        quantity: U256,
        funding_token: Address,
        funding_amount: U256,
    ) -> Self {
        let call = IRouter::placeOrderWithDepositCall {
            market,
            side: side.code(),
            price,
            quantity,
            fundingToken: funding_token,
            fundingAmount: funding_amount,
        };
        Self::new(router, "placeOrderWithDeposit", call.abi_encode())
    }

    /// `IRouter.placeMarketOrder(market, side, quantity)` funded from custody.
    pub fn place_market_order(
        router: Address,
        market: Address,
        side: OrderSide,
        quantity: U256,
    ) -> Self {
        let call = IRouter::placeMarketOrderCall {
            market,
            side: side.code(),
            quantity,
        };
        Self::new(router, "placeMarketOrder", call.abi_encode())
    }

    /// `IRouter.placeMarketOrderWithDeposit(...)` funded from the wallet.
    pub fn place_market_order_with_deposit(
        router: Address,
        market: Address,
        side: OrderSide,
        quantity: U256,
        funding_token: Address,
        funding_amount: U256,
    ) -> Self {
        let call = IRouter::placeMarketOrderWithDepositCall {
            market,
            side: side.code(),
            quantity,
            fundingToken: funding_token,
            fundingAmount: funding_amount,
        };
        Self::new(router, "placeMarketOrderWithDeposit", call.abi_encode())
    }

    /// `IPoolFactory.createPool(base, quote, tickSize, lotSize)`.
    pub fn create_pool(
        factory: Address,
        base: Address,
        quote: Address,
        tick_size: U256,
        lot_size: U256,
    ) -> Self {
        let call = IPoolFactory::createPoolCall {
            base,
            quote,
            tickSize: tick_size,
            lotSize: lot_size,
        };
        Self::new(factory, "createPool", call.abi_encode())
    }

    /// `IFaucet.requestToken(token)`.
    pub fn request_token(faucet: Address, token: Address) -> Self {
        let call = IFaucet::requestTokenCall { token };
        Self::new(faucet, "requestToken", call.abi_encode())
    }
}

/// Calldata for `IERC20.allowance(owner, spender)`.
pub fn allowance_calldata(owner: Address, spender: Address) -> Bytes {
    IERC20::allowanceCall { owner, spender }.abi_encode().into()
}

/// Decode the return data of `IERC20.allowance`.
pub fn decode_allowance(data: &[u8]) -> Result<U256, alloy::sol_types::Error> {
    IERC20::allowanceCall::abi_decode_returns(data)
}
